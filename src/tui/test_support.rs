//! Helpers shared by rendering tests.

use ratatui::buffer::Buffer;

/// Flattens a rendered buffer into lines of text.
pub(crate) fn buffer_to_string(buf: &Buffer) -> String {
    let mut s = String::new();
    for y in 0..buf.area.height {
        for x in 0..buf.area.width {
            s.push(buf[(x, y)].symbol().chars().next().unwrap_or(' '));
        }
        s.push('\n');
    }
    s
}
