//! Decoding of the five supported entity escapes: `&lt;` `&gt;` `&amp;`
//! `&apos;` `&quot;`. Anything else after a `&` is a scan error naming the
//! unexpected character and the alternatives that were legal at that point.

use mapxml_shared::byte_stream::Character::Ch;
use mapxml_shared::byte_stream::Stream;

use super::Scanner;
use crate::errors::ScanError;

impl Scanner<'_> {
    /// Decodes one `&...;` escape into the consume buffer. Returns `false`
    /// without consuming anything when the current character is not `&`.
    pub(super) fn scan_entity(&mut self) -> Result<bool, ScanError> {
        if self.stream.read() != Ch('&') {
            return Ok(false);
        }
        self.advance();

        match self.read_or_end()? {
            'l' => {
                self.advance();
                self.entity_tail("t;")?;
                self.consumed.push('<');
            }
            'g' => {
                self.advance();
                self.entity_tail("t;")?;
                self.consumed.push('>');
            }
            'q' => {
                self.advance();
                self.entity_tail("uot;")?;
                self.consumed.push('"');
            }
            'a' => {
                self.advance();
                match self.read_or_end()? {
                    'm' => {
                        self.advance();
                        self.entity_tail("p;")?;
                        self.consumed.push('&');
                    }
                    'p' => {
                        self.advance();
                        self.entity_tail("os;")?;
                        self.consumed.push('\'');
                    }
                    found => return Err(self.illegal_symbol(found, &["m", "p"])),
                }
            }
            found => return Err(self.illegal_symbol(found, &["l", "g", "a", "q"])),
        }

        Ok(true)
    }

    /// Consumes the remaining characters of an escape one at a time, failing
    /// on the first character that does not match.
    fn entity_tail(&mut self, tail: &str) -> Result<(), ScanError> {
        for expected in tail.chars() {
            let found = self.read_or_end()?;
            if found != expected {
                return Err(ScanError::IllegalSymbol {
                    found,
                    expected: vec![expected.to_string()],
                    location: self.location_handler.cur_location,
                });
            }
            self.advance();
        }
        Ok(())
    }
}
