//! Codepoint scanning and classification
//!
//! Walks a UTF-16 buffer one codepoint at a time and splits it into
//! segments that the host can draw natively (`Plain`) and codepoints that
//! must be substituted (`Special`).
//!
//! Positions are always code-unit offsets into the caller's buffer, so a
//! supplementary-plane codepoint advances the cursor by 2.

use serde::{Deserialize, Serialize};
use std::ops::{Range, RangeInclusive};
use std::str::FromStr;

use crate::constants::{
    BOOLEAN_FALSE_SENTINEL, BOOLEAN_TRUE_SENTINEL, FALLBACK_RANGE_END, FALLBACK_RANGE_START,
    HEART_RANGE_END, HEART_RANGE_START,
};

/// Which codepoints are substituted instead of drawn by the host font
///
/// Resolved once by the embedding application (typically from what the
/// platform's emoji font can render) and handed in as configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Only the boolean sentinels are substituted
    #[default]
    None,
    /// Sentinels plus the colored heart variants
    IconsOnly,
    /// Sentinels plus the whole fallback range
    FullRange,
}

impl FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "none" => Ok(Self::None),
            "icons_only" | "hearts" => Ok(Self::IconsOnly),
            "full_range" | "full" => Ok(Self::FullRange),
            other => Err(format!("unknown fallback policy: {}", other)),
        }
    }
}

/// How a special codepoint gets drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialKind {
    /// Procedural disc with check (`true`) or cross (`false`)
    Boolean(bool),
    /// Image cell from the fallback atlas
    Fallback,
}

/// Classification rule for one deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    pub policy: FallbackPolicy,
    /// Codepoints covered by the fallback atlas (end exclusive)
    pub fallback_range: Range<u32>,
    /// Codepoints substituted under [`FallbackPolicy::IconsOnly`]
    pub heart_range: RangeInclusive<u32>,
    pub false_sentinel: u32,
    pub true_sentinel: u32,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(FallbackPolicy::default())
    }
}

impl Classifier {
    /// Classifier with the built-in ranges and sentinels
    pub fn new(policy: FallbackPolicy) -> Self {
        Self {
            policy,
            fallback_range: FALLBACK_RANGE_START..FALLBACK_RANGE_END,
            heart_range: HEART_RANGE_START..=HEART_RANGE_END,
            false_sentinel: BOOLEAN_FALSE_SENTINEL,
            true_sentinel: BOOLEAN_TRUE_SENTINEL,
        }
    }

    /// Returns how `cp` is substituted, or `None` if the host draws it
    pub fn classify(&self, cp: u32) -> Option<SpecialKind> {
        if cp == self.false_sentinel {
            return Some(SpecialKind::Boolean(false));
        }
        if cp == self.true_sentinel {
            return Some(SpecialKind::Boolean(true));
        }
        let substituted = match self.policy {
            FallbackPolicy::None => false,
            FallbackPolicy::IconsOnly => self.heart_range.contains(&cp),
            FallbackPolicy::FullRange => self.fallback_range.contains(&cp),
        };
        substituted.then_some(SpecialKind::Fallback)
    }

    #[inline]
    pub fn is_special(&self, cp: u32) -> bool {
        self.classify(cp).is_some()
    }

    /// Scan `text[start..end]` into segments
    ///
    /// The range is clamped to the buffer.
    pub fn scan<'a>(&'a self, text: &'a [u16], start: usize, end: usize) -> RunScanner<'a> {
        RunScanner::new(self, text, start, end)
    }
}

/// One piece of a scanned range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// Host-drawable code units `[start, end)`, possibly empty
    Plain { start: usize, end: usize },
    /// A single substituted codepoint occupying `len` code units at `start`
    Special {
        codepoint: u32,
        kind: SpecialKind,
        start: usize,
        len: usize,
    },
}

impl Segment {
    /// Code-unit range covered by this segment
    pub fn range(&self) -> Range<usize> {
        match *self {
            Segment::Plain { start, end } => start..end,
            Segment::Special { start, len, .. } => start..start + len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.range().is_empty()
    }
}

/// Decode the codepoint at `pos`
///
/// Returns the scalar value and its length in code units. Unpaired
/// surrogates (including a pair split by the end of `text`) decode as
/// U+FFFD with length 1.
pub fn decode_at(text: &[u16], pos: usize) -> (u32, usize) {
    match char::decode_utf16(text[pos..].iter().copied()).next() {
        Some(Ok(c)) => (c as u32, c.len_utf16()),
        _ => (char::REPLACEMENT_CHARACTER as u32, 1),
    }
}

/// Lazy segment iterator over a code-unit range
///
/// Every special codepoint is preceded by a (possibly empty) `Plain`
/// segment, and the sequence always ends with a trailing `Plain`. The
/// segments tile the range in order. Clone before consuming to restart.
#[derive(Debug, Clone)]
pub struct RunScanner<'a> {
    classifier: &'a Classifier,
    text: &'a [u16],
    pos: usize,
    end: usize,
    /// Start of the pending plain run
    plain_start: usize,
    pending: Option<Segment>,
    done: bool,
}

impl<'a> RunScanner<'a> {
    pub fn new(classifier: &'a Classifier, text: &'a [u16], start: usize, end: usize) -> Self {
        let end = end.min(text.len());
        let start = start.min(end);
        Self {
            classifier,
            // Decoding never looks past `end`
            text: &text[..end],
            pos: start,
            end,
            plain_start: start,
            pending: None,
            done: false,
        }
    }
}

impl Iterator for RunScanner<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        if let Some(segment) = self.pending.take() {
            return Some(segment);
        }
        if self.done {
            return None;
        }

        while self.pos < self.end {
            let at = self.pos;
            let (codepoint, len) = decode_at(self.text, at);
            self.pos += len;

            if let Some(kind) = self.classifier.classify(codepoint) {
                let plain = Segment::Plain {
                    start: self.plain_start,
                    end: at,
                };
                self.plain_start = self.pos;
                self.pending = Some(Segment::Special {
                    codepoint,
                    kind,
                    start: at,
                    len,
                });
                return Some(plain);
            }
        }

        self.done = true;
        Some(Segment::Plain {
            start: self.plain_start,
            end: self.end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    fn assert_tiles(segments: &[Segment], start: usize, end: usize) {
        let mut cursor = start;
        for s in segments {
            let r = s.range();
            assert_eq!(r.start, cursor, "gap or overlap at {:?}", s);
            cursor = r.end;
        }
        assert_eq!(cursor, end);
    }

    #[test]
    fn test_plain_only() {
        let c = Classifier::new(FallbackPolicy::FullRange);
        let text = utf16("hello");
        let segs: Vec<_> = c.scan(&text, 0, text.len()).collect();
        assert_eq!(segs, vec![Segment::Plain { start: 0, end: 5 }]);
    }

    #[test]
    fn test_empty_range_yields_one_empty_plain() {
        let c = Classifier::default();
        let text = utf16("abc");
        let segs: Vec<_> = c.scan(&text, 2, 2).collect();
        assert_eq!(segs, vec![Segment::Plain { start: 2, end: 2 }]);
    }

    #[test]
    fn test_supplementary_codepoint_advances_two_units() {
        let c = Classifier::new(FallbackPolicy::FullRange);
        // U+1F600 GRINNING FACE
        let text = utf16("a\u{1F600}b");
        assert_eq!(text.len(), 4);
        let segs: Vec<_> = c.scan(&text, 0, text.len()).collect();
        assert_eq!(
            segs,
            vec![
                Segment::Plain { start: 0, end: 1 },
                Segment::Special {
                    codepoint: 0x1F600,
                    kind: SpecialKind::Fallback,
                    start: 1,
                    len: 2
                },
                Segment::Plain { start: 3, end: 4 },
            ]
        );
    }

    #[test]
    fn test_special_at_start_has_empty_plain() {
        let c = Classifier::default();
        let text = utf16("\u{F889}ok");
        let segs: Vec<_> = c.scan(&text, 0, text.len()).collect();
        assert_eq!(segs[0], Segment::Plain { start: 0, end: 0 });
        assert!(segs[0].is_empty());
        assert_eq!(
            segs[1],
            Segment::Special {
                codepoint: 0xF889,
                kind: SpecialKind::Boolean(true),
                start: 0,
                len: 1
            }
        );
        assert_tiles(&segs, 0, text.len());
    }

    #[test]
    fn test_policy_monotonicity() {
        let heart = 0x1F49A;
        assert!(!Classifier::new(FallbackPolicy::None).is_special(heart));
        assert!(Classifier::new(FallbackPolicy::IconsOnly).is_special(heart));
        assert!(Classifier::new(FallbackPolicy::FullRange).is_special(heart));

        // Non-heart emoji only under full range
        assert!(!Classifier::new(FallbackPolicy::IconsOnly).is_special(0x1F600));
        assert!(Classifier::new(FallbackPolicy::FullRange).is_special(0x1F600));

        for policy in [
            FallbackPolicy::None,
            FallbackPolicy::IconsOnly,
            FallbackPolicy::FullRange,
        ] {
            let c = Classifier::new(policy);
            assert_eq!(c.classify(0xF888), Some(SpecialKind::Boolean(false)));
            assert_eq!(c.classify(0xF889), Some(SpecialKind::Boolean(true)));
            assert_eq!(c.classify('A' as u32), None);
        }
    }

    #[test]
    fn test_range_bounds() {
        let c = Classifier::new(FallbackPolicy::FullRange);
        assert!(c.is_special(0x1F300));
        assert!(c.is_special(0x1FEFF));
        assert!(!c.is_special(0x1FF00));
        assert!(!c.is_special(0x1F2FF));
    }

    #[test]
    fn test_remapped_sentinels() {
        let c = Classifier {
            false_sentinel: 0xE000,
            true_sentinel: 0xE001,
            ..Classifier::default()
        };
        assert_eq!(c.classify(0xE001), Some(SpecialKind::Boolean(true)));
        assert_eq!(c.classify(0xF889), None);
    }

    #[test]
    fn test_unpaired_surrogate_is_plain() {
        let c = Classifier::new(FallbackPolicy::FullRange);
        let text = vec![b'a' as u16, 0xD800, b'b' as u16];
        let segs: Vec<_> = c.scan(&text, 0, text.len()).collect();
        assert_eq!(segs, vec![Segment::Plain { start: 0, end: 3 }]);
    }

    #[test]
    fn test_pair_split_by_range_end_stays_in_range() {
        let c = Classifier::new(FallbackPolicy::FullRange);
        let text = utf16("x\u{1F600}");
        // End cuts the surrogate pair in half
        let segs: Vec<_> = c.scan(&text, 0, 2).collect();
        assert_eq!(segs, vec![Segment::Plain { start: 0, end: 2 }]);
    }

    #[test]
    fn test_scanner_is_restartable() {
        let c = Classifier::new(FallbackPolicy::FullRange);
        let text = utf16("\u{1F600}\u{1F601}x\u{F888}");
        let scanner = c.scan(&text, 0, text.len());
        let first: Vec<_> = scanner.clone().collect();
        let second: Vec<_> = scanner.collect();
        assert_eq!(first, second);
        assert_tiles(&first, 0, text.len());
        // Two adjacent specials are separated by an empty plain
        assert_eq!(first[2], Segment::Plain { start: 2, end: 2 });
    }

    #[test]
    fn test_subrange_offsets() {
        let c = Classifier::default();
        let text = utf16("ab\u{F888}cd\u{F889}ef");
        let segs: Vec<_> = c.scan(&text, 1, 7).collect();
        assert_tiles(&segs, 1, 7);
        assert_eq!(segs.len(), 5);
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!("full_range".parse::<FallbackPolicy>(), Ok(FallbackPolicy::FullRange));
        assert_eq!("icons-only".parse::<FallbackPolicy>(), Ok(FallbackPolicy::IconsOnly));
        assert_eq!("NONE".parse::<FallbackPolicy>(), Ok(FallbackPolicy::None));
        assert!("sometimes".parse::<FallbackPolicy>().is_err());
    }
}
