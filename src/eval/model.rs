//! Learned scalar correction to the pattern evaluation
//!
//! A single hidden layer with ReLU and one linear output. Inputs are the
//! flattened board from the scored side's perspective (+1 own, -1 opponent,
//! 0 empty). Parameters start uniform in [-0.5, 0.5) and only change through
//! [`ValueModel::train`].

/// Small fully connected value model.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueModel {
    input_size: usize,
    hidden_size: usize,
    /// Input → hidden weights, row-major `[input][hidden]`
    w1: Vec<f64>,
    b1: Vec<f64>,
    /// Hidden → output weights
    w2: Vec<f64>,
    b2: f64,
}

impl ValueModel {
    /// Random initialisation drawn from `rng`.
    pub fn new(input_size: usize, hidden_size: usize, rng: &mut fastrand::Rng) -> Self {
        let mut uniform = || rng.f64() - 0.5;
        let w1 = (0..input_size * hidden_size).map(|_| uniform()).collect();
        let w2 = (0..hidden_size).map(|_| uniform()).collect();
        let b1 = (0..hidden_size).map(|_| uniform()).collect();
        let b2 = uniform();
        Self {
            input_size,
            hidden_size,
            w1,
            b1,
            w2,
            b2,
        }
    }

    /// Deterministic initialisation when `seed` is set.
    pub fn with_seed(input_size: usize, hidden_size: usize, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(s) => fastrand::Rng::with_seed(s),
            None => fastrand::Rng::new(),
        };
        Self::new(input_size, hidden_size, &mut rng)
    }

    #[inline]
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    #[inline]
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// ReLU hidden activations. Zero inputs are skipped, which is most of
    /// the board.
    fn hidden(&self, input: &[f64]) -> Vec<f64> {
        debug_assert_eq!(input.len(), self.input_size);
        let h = self.hidden_size;
        let mut acc = vec![0.0; h];
        for (i, &x) in input.iter().enumerate() {
            if x == 0.0 {
                continue;
            }
            let row = &self.w1[i * h..(i + 1) * h];
            for (a, &w) in acc.iter_mut().zip(row) {
                *a += w * x;
            }
        }
        acc.iter()
            .zip(&self.b1)
            .map(|(&a, &b)| (a + b).max(0.0))
            .collect()
    }

    #[inline]
    fn output(&self, hidden: &[f64]) -> f64 {
        hidden.iter().zip(&self.w2).map(|(&h, &w)| h * w).sum::<f64>() + self.b2
    }

    /// Scalar output for one board encoding.
    pub fn forward(&self, input: &[f64]) -> f64 {
        self.output(&self.hidden(input))
    }

    /// One gradient step towards `target`. Returns the output error
    /// `target - output` measured before the update.
    ///
    /// The hidden error is the output error spread through the pre-update
    /// output weights, without a ReLU gate.
    pub fn train(&mut self, input: &[f64], target: f64, learning_rate: f64) -> f64 {
        let hidden = self.hidden(input);
        let output = self.output(&hidden);

        let output_error = target - output;
        let hidden_error: Vec<f64> = self.w2.iter().map(|&w| w * output_error).collect();

        for (w, &h) in self.w2.iter_mut().zip(&hidden) {
            *w += learning_rate * output_error * h;
        }
        self.b2 += learning_rate * output_error;

        let h = self.hidden_size;
        for (i, &x) in input.iter().enumerate() {
            if x == 0.0 {
                continue;
            }
            let row = &mut self.w1[i * h..(i + 1) * h];
            for (w, &e) in row.iter_mut().zip(&hidden_error) {
                *w += learning_rate * e * x;
            }
        }
        for (b, &e) in self.b1.iter_mut().zip(&hidden_error) {
            *b += learning_rate * e;
        }

        output_error
    }
}
