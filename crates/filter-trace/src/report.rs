//! Rendering surviving threads back into dump text.

use eos_stackparser::ThreadStack;

/// Render threads the way GDB printed them: each thread block followed by
/// a blank line before the next one. There is no trailing newline.
pub fn render<'a>(threads: impl IntoIterator<Item = &'a ThreadStack>) -> String {
    threads
        .into_iter()
        .map(ThreadStack::to_string)
        .collect::<Vec<_>>()
        .join("\n\n")
}
