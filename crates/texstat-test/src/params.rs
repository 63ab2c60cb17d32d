//! Regression test parameters and operations

use crate::error::TestError;
use texstat_core::Float4;

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Compare and record failures (default)
    #[default]
    Compare,
    /// Compare and also print every checked value
    Display,
}

impl RegTestMode {
    /// Parse mode from the `REGTEST_MODE` environment variable
    pub fn from_env() -> Self {
        match std::env::var("REGTEST_MODE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test parameters
///
/// Tracks the test name, the running comparison index and every failure,
/// so a test can run all its checks and report them together through
/// [`cleanup`](RegParams::cleanup).
pub struct RegParams {
    /// Name of the test (e.g., "windowed_stats")
    pub test_name: String,
    /// Current test index (incremented before each comparison)
    index: usize,
    /// Test mode
    pub mode: RegTestMode,
    /// Overall success status
    success: bool,
    /// Recorded failures
    failures: Vec<String>,
}

impl RegParams {
    /// Create new regression test parameters
    ///
    /// The mode is taken from the `REGTEST_MODE` environment variable.
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();

        eprintln!();
        eprintln!("////////////////////////////////////////////////");
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("////////////////////////////////////////////////");
        eprintln!("Mode: {:?}", mode);

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            success: true,
            failures: Vec::new(),
        }
    }

    /// Get the current test index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if in display mode
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    fn fail(&mut self, err: TestError) {
        let msg = format!("Failure in {}_reg: {}", self.test_name, err);
        eprintln!("{}", msg);
        self.failures.push(msg);
        self.success = false;
    }

    /// Compare two floating-point values
    ///
    /// # Returns
    ///
    /// `true` if values match within delta, `false` otherwise.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();

        if self.display() {
            eprintln!(
                "[{:03}] expected = {}, actual = {}, diff = {}",
                self.index, expected, actual, diff
            );
        }

        // NaN never matches
        if diff <= delta {
            true
        } else {
            self.fail(TestError::ValueMismatch {
                index: self.index,
                expected,
                actual,
                delta,
            });
            false
        }
    }

    /// Compare all four lanes of two [`Float4`] values
    ///
    /// Counts as one comparison index.
    pub fn compare_float4(&mut self, expected: Float4, actual: Float4, delta: f32) -> bool {
        self.index += 1;
        for c in 0..4 {
            let diff = (expected[c] - actual[c]).abs();
            if !(diff <= delta) {
                self.fail(TestError::ValueMismatch {
                    index: self.index,
                    expected: expected[c] as f64,
                    actual: actual[c] as f64,
                    delta: delta as f64,
                });
                return false;
            }
        }
        true
    }

    /// Compare two slices element by element
    ///
    /// Counts as one comparison index; only the first mismatch is recorded.
    pub fn compare_slices(&mut self, expected: &[f32], actual: &[f32], delta: f32) -> bool {
        self.index += 1;
        if expected.len() != actual.len() {
            self.fail(TestError::LengthMismatch {
                index: self.index,
                expected: expected.len(),
                actual: actual.len(),
            });
            return false;
        }

        let worst = expected
            .iter()
            .zip(actual)
            .map(|(e, a)| (e - a).abs())
            .fold(0.0f32, |m, d| if d > m || d.is_nan() { d } else { m });
        if self.display() {
            let n = expected.len();
            eprintln!("[{:03}] {} values, max diff = {}", self.index, n, worst);
        }

        for (e, a) in expected.iter().zip(actual) {
            if !((e - a).abs() <= delta) {
                self.fail(TestError::ValueMismatch {
                    index: self.index,
                    expected: *e as f64,
                    actual: *a as f64,
                    delta: delta as f64,
                });
                return false;
            }
        }
        true
    }

    /// Clean up and report results
    ///
    /// # Returns
    ///
    /// `true` if all tests passed, `false` if any failed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        eprintln!();

        self.success
    }

    /// Check if all tests have passed so far
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get list of failures
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}
