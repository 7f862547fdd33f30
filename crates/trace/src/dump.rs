use wirejam_core::Direction;

/// Bytes shown per hex dump line.
const HEX_BYTES_PER_LINE: usize = 16;

/// Width of the hex column when the ASCII column follows it
/// (16 bytes * 2 hex digits + 15 separating spaces).
const HEX_COLUMN_WIDTH: usize = 47;

/// Per-direction traffic dump sink.
///
/// Does nothing unless at least one of the two toggles is on.
#[derive(Debug, Clone)]
pub struct TrafficDump {
    label: char,
    text: bool,
    hexadecimal: bool,
}

impl TrafficDump {
    pub fn new(direction: Direction, text: bool, hexadecimal: bool) -> Self {
        Self {
            label: direction.label(),
            text,
            hexadecimal,
        }
    }

    /// A sink with both toggles off; `record` is a no-op.
    pub fn disabled(direction: Direction) -> Self {
        Self::new(direction, false, false)
    }

    pub fn enabled(&self) -> bool {
        self.text || self.hexadecimal
    }

    /// Record one relayed chunk starting at byte offset `start`.
    ///
    /// Prints a header line with direction label, wall-clock timestamp and
    /// the offset range covered, then the chunk body in the configured
    /// rendering, then a `--` separator.
    pub fn record(&self, start: u64, chunk: &[u8]) {
        if !self.enabled() {
            return;
        }

        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f");
        let end = (start + chunk.len() as u64).saturating_sub(1);
        println!(
            "{} {} length={} from={} to={}",
            self.label,
            now,
            chunk.len(),
            start,
            end
        );
        if !chunk.is_empty() {
            if self.hexadecimal {
                println!("{}", render_hex(chunk, self.text));
            } else {
                println!("{}", render_text(chunk));
            }
        }
        println!("--");
    }
}

/// Render a chunk as 16-byte hex lines, with a printable-ASCII column when
/// `with_ascii` is set (non-printables shown as `.`).
fn render_hex(chunk: &[u8], with_ascii: bool) -> String {
    let mut lines = Vec::with_capacity(chunk.len().div_ceil(HEX_BYTES_PER_LINE));
    for row in chunk.chunks(HEX_BYTES_PER_LINE) {
        let hex: Vec<String> = row.iter().map(|byte| format!("{:02x}", byte)).collect();
        let hex = hex.join(" ");
        if with_ascii {
            let ascii: String = row
                .iter()
                .map(|&byte| {
                    if (32..127).contains(&byte) {
                        byte as char
                    } else {
                        '.'
                    }
                })
                .collect();
            lines.push(format!("{:<width$}  {}", hex, ascii, width = HEX_COLUMN_WIDTH));
        } else {
            lines.push(hex);
        }
    }
    lines.join("\n")
}

/// Render a chunk as plain text, or a notice when it is not valid UTF-8.
fn render_text(chunk: &[u8]) -> String {
    match std::str::from_utf8(chunk) {
        Ok(text) => text.to_string(),
        Err(_) => "Data contains bytes that cannot be decoded in UTF-8".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_lines_hold_sixteen_bytes() {
        let chunk: Vec<u8> = (0..40).collect();
        let rendered = render_hex(&chunk, false);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "00 01 02 03 04 05 06 07 08 09 0a 0b 0c 0d 0e 0f");
        assert_eq!(lines[2], "20 21 22 23 24 25 26 27");
    }

    #[test]
    fn hex_with_ascii_column() {
        let rendered = render_hex(b"AB\x00C", true);
        assert_eq!(rendered, format!("{:<47}  {}", "41 42 00 43", "AB.C"));
    }

    #[test]
    fn ascii_column_masks_non_printables() {
        let chunk = [0x7fu8, 0x20, 0x7e, 0x1f];
        let rendered = render_hex(&chunk, true);
        assert!(rendered.ends_with(". ~."));
    }

    #[test]
    fn text_render_decodes_utf8() {
        assert_eq!(render_text("ciao".as_bytes()), "ciao");
    }

    #[test]
    fn text_render_falls_back_on_invalid_utf8() {
        assert_eq!(
            render_text(&[0xff, 0xfe]),
            "Data contains bytes that cannot be decoded in UTF-8"
        );
    }

    #[test]
    fn disabled_sink_reports_disabled() {
        assert!(!TrafficDump::disabled(Direction::AtoB).enabled());
        assert!(TrafficDump::new(Direction::BtoA, false, true).enabled());
    }
}
