//! Durable best-score storage
//!
//! One LocalStorage key holding a non-negative integer. Missing or
//! unparsable values read as zero; the key is overwritten only when a run
//! strictly beats it. When storage is unavailable the game silently runs
//! with a zero best and never persists.

/// The stored best score
#[derive(Debug, Clone, Copy, Default)]
pub struct HighScore {
    pub value: u32,
}

impl HighScore {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "islandHopperHighScore";

    pub fn new() -> Self {
        Self { value: 0 }
    }

    /// Fold a finished run into the best score. Returns true when the value
    /// changed and should be persisted.
    pub fn record(&mut self, final_score: u32) -> bool {
        if final_score > self.value {
            self.value = final_score;
            true
        } else {
            false
        }
    }

    /// Load the best score from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        let Some(storage) = storage else {
            log::warn!("LocalStorage unavailable, best score will not persist");
            return Self::new();
        };

        if let Ok(Some(raw)) = storage.get_item(Self::STORAGE_KEY) {
            if let Ok(value) = raw.parse::<u32>() {
                log::info!("Loaded best score: {}", value);
                return Self { value };
            }
        }

        log::info!("No stored best score, starting at 0");
        Self::new()
    }

    /// Save the best score to LocalStorage (WASM only). Silent no-op when
    /// storage is unavailable.
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            let _ = storage.set_item(Self::STORAGE_KEY, &self.value.to_string());
            log::info!("Best score saved: {}", self.value);
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_keeps_the_maximum() {
        let mut best = HighScore::new();
        assert!(best.record(10));
        assert_eq!(best.value, 10);

        // Equal or worse runs change nothing
        assert!(!best.record(10));
        assert!(!best.record(3));
        assert_eq!(best.value, 10);

        assert!(best.record(11));
        assert_eq!(best.value, 11);
    }

    #[test]
    fn zero_score_never_persists() {
        let mut best = HighScore::new();
        assert!(!best.record(0));
        assert_eq!(best.value, 0);
    }
}
