//! Incremental text-encoding detection.
//!
//! A fixed list of candidate encodings is decoded in lockstep, one line at a time. A candidate is
//! eliminated as soon as its decoder reports a malformed sequence. Detection becomes confident when
//! a byte-order mark is seen, or when non-ASCII input has been fed and exactly one candidate
//! survives. Otherwise, once the input is exhausted, the survivor whose decoding is most plausible
//! is chosen, with ties going to the higher priority.
//!
//! Plausibility matters because EUC-JP kanji and kana are built from bytes in `0xA1..=0xFE`, most
//! of which Shift_JIS reads as single half-width katakana without error. A decoding counts one
//! implausible character for every half-width katakana it yields.

use std::io;
use std::io::{BufRead, Seek};

use encoding_rs::{Decoder, DecoderResult, Encoding, EUC_JP, SHIFT_JIS, UTF_8, WINDOWS_1252};
use tracing::trace;

/// Candidate encodings, in order of priority.
pub fn candidates() -> [&'static Encoding; 3] {
    [UTF_8, SHIFT_JIS, EUC_JP]
}

/// Used when every candidate has been eliminated; decodes any byte sequence.
pub fn fallback() -> &'static Encoding {
    WINDOWS_1252
}

struct Candidate {
    encoding: &'static Encoding,
    decoder: Decoder,
    viable: bool,
    implausible: usize,
}

pub struct EncodingDetector {
    candidates: Vec<Candidate>,
    bom: Option<&'static Encoding>,
    started: bool,
    non_ascii: bool,
    scratch: String,
}
impl EncodingDetector {
    /// Feeds the next chunk of input, returning `true` once detection is confident and no further
    /// input is required.
    pub fn feed(&mut self, chunk: &[u8], last: bool) -> bool {
        if !self.started {
            self.started = true;
            if let Some((encoding, _)) = Encoding::for_bom(chunk) {
                self.bom = Some(encoding);
                return true;
            }
        }
        if self.done() {
            return true;
        }

        if !chunk.is_ascii() {
            self.non_ascii = true;
        }
        for candidate in self.candidates.iter_mut().filter(|candidate| candidate.viable) {
            match decode(&mut candidate.decoder, chunk, last, &mut self.scratch) {
                Some(implausible) => candidate.implausible += implausible,
                None => {
                    trace!("eliminated encoding {}", candidate.encoding.name());
                    candidate.viable = false;
                }
            }
        }
        self.done()
    }

    pub fn done(&self) -> bool {
        if self.bom.is_some() {
            return true;
        }
        match self.viable().count() {
            0 => true,
            1 => self.non_ascii,
            _ => false,
        }
    }

    /// Completes detection, yielding the chosen encoding.
    pub fn close(self) -> &'static Encoding {
        if let Some(encoding) = self.bom {
            return encoding;
        }
        // min_by_key keeps the first of equal minima, which is the higher priority
        match self
            .candidates
            .iter()
            .filter(|candidate| candidate.viable)
            .min_by_key(|candidate| candidate.implausible)
        {
            Some(candidate) => candidate.encoding,
            None => fallback(),
        }
    }

    fn viable(&self) -> impl Iterator<Item = &'static Encoding> + '_ {
        self.candidates
            .iter()
            .filter(|candidate| candidate.viable)
            .map(|candidate| candidate.encoding)
    }
}

impl Default for EncodingDetector {
    fn default() -> Self {
        let candidates = candidates()
            .into_iter()
            .map(|encoding| Candidate {
                encoding,
                decoder: encoding.new_decoder_without_bom_handling(),
                viable: true,
                implausible: 0,
            })
            .collect();
        Self {
            candidates,
            bom: None,
            started: false,
            non_ascii: false,
            scratch: String::with_capacity(256),
        }
    }
}

fn is_halfwidth_katakana(c: char) -> bool {
    ('\u{FF61}'..='\u{FF9F}').contains(&c)
}

/// Decodes `chunk`, returning the number of implausible characters produced, or `None` if the
/// chunk is malformed for this decoder.
fn decode(decoder: &mut Decoder, mut chunk: &[u8], last: bool, scratch: &mut String) -> Option<usize> {
    let mut implausible = 0;
    loop {
        scratch.clear();
        if let Some(needed) = decoder.max_utf8_buffer_length_without_replacement(chunk.len()) {
            scratch.reserve(needed);
        }
        let (result, read) = decoder.decode_to_string_without_replacement(chunk, scratch, last);
        implausible += scratch.chars().filter(|&c| is_halfwidth_katakana(c)).count();
        match result {
            DecoderResult::InputEmpty => return Some(implausible),
            DecoderResult::OutputFull => {
                chunk = &chunk[read..];
                scratch.reserve(chunk.len() * 3 + 16);
            }
            DecoderResult::Malformed(_, _) => return None,
        }
    }
}

/// Detects the encoding of `stream`, one line at a time. The stream is rewound both before and after
/// detection so that it may be read again.
pub fn detect_encoding<R: BufRead + Seek>(stream: &mut R) -> Result<&'static Encoding, io::Error> {
    stream.rewind()?;
    let mut detector = EncodingDetector::default();
    let mut line = Vec::new();
    loop {
        line.clear();
        if stream.read_until(b'\n', &mut line)? == 0 {
            detector.feed(&[], true);
            break;
        }
        if detector.feed(&line, false) {
            break;
        }
    }
    stream.rewind()?;
    Ok(detector.close())
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use super::*;

    fn detect(bytes: &[u8]) -> &'static Encoding {
        detect_encoding(&mut Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn ascii_is_utf8() {
        assert_eq!(UTF_8, detect(b"name,odds\nA,2.0\n"));
    }

    #[test]
    fn empty_is_utf8() {
        assert_eq!(UTF_8, detect(b""));
    }

    #[test]
    fn utf8_japanese() {
        assert_eq!(UTF_8, detect("馬名,単勝オッズ\nサクラ,2.0\n".as_bytes()));
    }

    #[test]
    fn shift_jis_japanese() {
        let (bytes, _, unmappable) = SHIFT_JIS.encode("馬名,単勝オッズ\nサクラ,2.0\n");
        assert!(!unmappable);
        assert_eq!(SHIFT_JIS, detect(&bytes));
    }

    #[test]
    fn euc_jp_japanese() {
        let (bytes, _, unmappable) = EUC_JP.encode("馬名,単勝オッズ\nサクラ,2.0\n");
        assert!(!unmappable);
        assert_eq!(EUC_JP, detect(&bytes));
    }

    #[test]
    fn euc_jp_kanji_headers() {
        for text in ["馬名,単勝\nA,2.0\nB,4.0\n", "馬名,複勝率\nA,0.6\nB,0.2\n"] {
            let (bytes, _, unmappable) = EUC_JP.encode(text);
            assert!(!unmappable);
            assert_eq!(EUC_JP, detect(&bytes), "{text}");
        }
    }

    #[test]
    fn survivors_ranked_by_plausibility() {
        let (bytes, _, _) = EUC_JP.encode("馬名,単勝\n");
        let mut detector = EncodingDetector::default();
        assert!(!detector.feed(&bytes, false));
        assert!(!detector.feed(&[], true));
        assert_eq!(
            vec![SHIFT_JIS, EUC_JP],
            detector.viable().collect::<Vec<_>>()
        );
        assert_eq!(EUC_JP, detector.close());
    }

    #[test]
    fn bom_is_conclusive() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"name,odds\n");
        assert_eq!(UTF_8, detect(&bytes));
    }

    #[test]
    fn undecodable_falls_back() {
        assert_eq!(fallback(), detect(&[b'a', 0xFF, 0xFF, 0xFF, b'\n']));
    }

    #[test]
    fn stream_is_rewound() {
        let mut cursor = Cursor::new(b"name,odds\nA,2.0\n".to_vec());
        cursor.set_position(5);
        detect_encoding(&mut cursor).unwrap();
        assert_eq!(0, cursor.position());
        let mut contents = String::new();
        cursor.read_to_string(&mut contents).unwrap();
        assert_eq!("name,odds\nA,2.0\n", contents);
    }

    #[test]
    fn detector_stops_when_confident() {
        let mut detector = EncodingDetector::default();
        assert!(!detector.feed(b"name,odds\n", false));
        let (bytes, _, _) = SHIFT_JIS.encode("サクラ,2.0\n");
        assert!(detector.feed(&bytes, false));
        assert_eq!(SHIFT_JIS, detector.close());
    }
}
