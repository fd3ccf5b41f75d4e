//! Training-example recorder.
//!
//! Examples are written in sparse libsvm format, one per line, with a
//! parallel `.weight` stream holding one instance weight per example (the
//! weight line is written before its example line). Files are opened in
//! append mode so training data from multiple problems accumulates; a file
//! that cannot be opened degrades the recorder to a no-op rather than
//! failing the run, and individual write errors are ignored.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::feat::FeatureVector;

/// Appends ranking and classification examples to a trajectory file.
#[derive(Debug)]
pub struct TrajectoryRecorder {
    examples: BufWriter<std::fs::File>,
    weights: BufWriter<std::fs::File>,

    /// Run-global alternation bit; flipped before every pairwise example.
    /// Starts set so that the first example comes out unswapped.
    negate: bool,
}

impl TrajectoryRecorder {
    /// Open `<path>` and `<path>.weight` for appending.
    ///
    /// Returns None (with a warning) when either file cannot be opened; the
    /// caller then simply records nothing.
    pub fn open(path: &Path) -> Option<Self> {
        let mut weight_path = path.as_os_str().to_owned();
        weight_path.push(".weight");

        let open = |p: &Path| OpenOptions::new().append(true).create(true).open(p);
        let examples = match open(path) {
            Ok(f) => f,
            Err(err) => {
                log::warn!(
                    "cannot open trajectory file <{}> ({err}); no training data will be recorded",
                    path.display()
                );
                return None;
            }
        };
        let weights = match open(Path::new(&weight_path)) {
            Ok(f) => f,
            Err(err) => {
                log::warn!(
                    "cannot open weight file <{:?}> ({err}); no training data will be recorded",
                    weight_path
                );
                return None;
            }
        };

        Some(Self {
            examples: BufWriter::new(examples),
            weights: BufWriter::new(weights),
            negate: true,
        })
    }

    /// Record one pairwise ranking example: `winner` should score above
    /// `loser` under the given label polarity.
    ///
    /// The alternation bit flips before every example; when set, the roles
    /// are swapped and the label negated, so the emitted stream is balanced
    /// between positive and negative orientations. The instance weight is
    /// taken from the winner's depth before any swap.
    pub fn record_pair(&mut self, winner: &FeatureVector, loser: &FeatureVector, label: i32) {
        assert!(winner.depth() > 0 && loser.depth() > 0);
        assert_eq!(winner.len(), loser.len());

        self.negate = !self.negate;

        let _ = writeln!(self.weights, "{:.6}", winner.example_weight());

        let (first, second, label) = if self.negate {
            (loser, winner, -label)
        } else {
            (winner, loser, label)
        };

        let _ = self.write_diff(first, second, label);
    }

    /// Record one classification example for a single node.
    pub fn record_single(&mut self, feat: &FeatureVector, label: i32) {
        assert!(feat.depth() > 0);

        let _ = writeln!(self.weights, "{:.6}", feat.example_weight());

        let offset = feat.offset();
        let _ = write!(self.examples, "{label} ");
        for (i, v) in feat.values().iter().enumerate() {
            let _ = write!(self.examples, "{}:{:.6} ", i + offset + 1, v);
        }
        let _ = writeln!(self.examples);
    }

    /// Flush both streams.
    pub fn flush(&mut self) {
        let _ = self.examples.flush();
        let _ = self.weights.flush();
    }

    /// Write `plus - minus` as a sparse line with 1-based ascending indices.
    ///
    /// When the two sides live in different weight windows the block with
    /// the smaller offset is written first, as the format requires sorted
    /// indices.
    fn write_diff(
        &mut self,
        plus: &FeatureVector,
        minus: &FeatureVector,
        label: i32,
    ) -> std::io::Result<()> {
        let size = plus.len();
        let plus_offset = plus.offset();
        let minus_offset = minus.offset();

        write!(self.examples, "{label} ")?;

        if plus_offset == minus_offset {
            for i in 0..size {
                write!(
                    self.examples,
                    "{}:{:.6} ",
                    i + plus_offset + 1,
                    plus.values()[i] - minus.values()[i]
                )?;
            }
        } else if plus_offset < minus_offset {
            for i in 0..size {
                write!(self.examples, "{}:{:.6} ", i + plus_offset + 1, plus.values()[i])?;
            }
            for i in 0..size {
                write!(self.examples, "{}:{:.6} ", i + minus_offset + 1, -minus.values()[i])?;
            }
        } else {
            for i in 0..size {
                write!(self.examples, "{}:{:.6} ", i + minus_offset + 1, -minus.values()[i])?;
            }
            for i in 0..size {
                write!(self.examples, "{}:{:.6} ", i + plus_offset + 1, plus.values()[i])?;
            }
        }

        writeln!(self.examples)
    }
}
