//! Link functions between raw model margins and reported outputs.

/// Logistic sigmoid, evaluated without overflow for large `|margin|`.
pub fn sigmoid(margin: f64) -> f64 {
    if margin >= 0.0 {
        1.0 / (1.0 + (-margin).exp())
    } else {
        let e = margin.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_is_centered_and_bounded() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(sigmoid(-800.0).is_finite());
    }

    #[test]
    fn sigmoid_is_symmetric() {
        for m in [0.1, 1.0, 3.5, 12.0] {
            assert!((sigmoid(m) + sigmoid(-m) - 1.0).abs() < 1e-12);
        }
    }
}
