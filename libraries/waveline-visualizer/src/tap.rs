//! Analysis tap seam

/// Non-destructive probe into the playing signal
///
/// A tap observes the engine's mixed output and exposes frequency-magnitude
/// snapshots; it never alters what is heard.
pub trait AnalysisTap {
    /// Number of frequency bins in a snapshot (half the FFT size)
    fn frequency_bin_count(&self) -> usize;

    /// Write the current magnitudes (0-255, low to high frequency) into `out`
    ///
    /// Writes `min(out.len(), frequency_bin_count())` values.
    fn byte_frequency_data(&mut self, out: &mut [u8]);
}

impl<T: AnalysisTap + ?Sized> AnalysisTap for Box<T> {
    fn frequency_bin_count(&self) -> usize {
        (**self).frequency_bin_count()
    }

    fn byte_frequency_data(&mut self, out: &mut [u8]) {
        (**self).byte_frequency_data(out);
    }
}
