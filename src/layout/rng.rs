// Deterministic shuffling for wave order.
//
// A 32-bit linear congruential generator reseeded from the school name at the
// start of every run, so identical inputs always produce identical layouts.

#[derive(Debug, Clone)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Seed from a 31-multiplier string hash of the school name.
    pub fn for_school(name: &str) -> Self {
        let seed = name
            .chars()
            .fold(0u32, |h, c| h.wrapping_mul(31).wrapping_add(c as u32));
        Self::new(seed)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        self.state
    }

    /// Uniform in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / 4_294_967_296.0
    }

    /// Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = (self.next_f64() * (i + 1) as f64) as usize;
            items.swap(i, j.min(i));
        }
    }
}
