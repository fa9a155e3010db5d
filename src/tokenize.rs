/// Lazy iterator over the space-separated words of a byte buffer.
///
/// Only the space byte (0x20) separates words. Tab is an ordinary word
/// byte here even though the chunk reader trims chunks at tabs, so a tab
/// that survives inside a chunk stays embedded in its token. That
/// asymmetry matches the observed behavior this tool reproduces.
pub fn tokenize(buf: &[u8]) -> Tokens<'_> {
    Tokens { rest: buf }
}

pub struct Tokens<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        // Skip the run of spaces before the next word; none left means done.
        let start = self.rest.iter().position(|&b| b != b' ')?;
        let rest = &self.rest[start..];
        let end = rest.iter().position(|&b| b == b' ').unwrap_or(rest.len());
        self.rest = &rest[end..];
        Some(&rest[..end])
    }
}
