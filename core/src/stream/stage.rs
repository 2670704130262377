//! stream/stage.rs

use std::io::{self, Write};

/// A writer stage that must be explicitly finished.
///
/// Finishing flushes whatever the stage buffers (gzip trailer, final cipher
/// block, MAC digest) into the next stage and hands that stage back, so the
/// caller closes stages strictly innermost-last.
pub trait Stage: Write + Sized {
    type Output;

    fn finish(self) -> io::Result<Self::Output>;
}
