pub mod chat;
pub mod repl;
pub mod serve;
pub mod tools;

/// Clear the terminal.
pub(crate) fn clear_screen() -> std::io::Result<()> {
    console::Term::stdout().clear_screen()
}
