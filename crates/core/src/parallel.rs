#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

#[cfg(not(target_arch = "wasm32"))]
const PARALLEL_THRESHOLD: usize = 1024;

/// Evaluates `f` for every index in `0..len` and collects the results in
/// index order. Large ranges are spread over the rayon pool; each call owns
/// its output slot, so the result does not depend on scheduling.
pub fn map_indexed<T, F>(len: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    #[cfg(not(target_arch = "wasm32"))]
    {
        if len >= PARALLEL_THRESHOLD {
            return (0..len).into_par_iter().map(&f).collect();
        }
    }

    (0..len).map(f).collect()
}
