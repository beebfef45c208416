use rand::distr::{Distribution, StandardUniform, uniform::SampleUniform};
use rand::rngs::SmallRng;
use rand::{Rng, RngExt, SeedableRng};
use std::cell::RefCell;
use std::ops::Range;
use std::sync::{Arc, LazyLock, Mutex};

static GLOBAL_RNG: LazyLock<Arc<Mutex<SmallRng>>> =
    LazyLock::new(|| Arc::new(Mutex::new(SmallRng::from_rng(&mut rand::rng()))));

thread_local! {
    static TLS_RNG: RefCell<SmallRng> = RefCell::new({
        let mut global = GLOBAL_RNG.lock().unwrap();
        SmallRng::seed_from_u64(global.next_u64())
    });
}

fn with_rng<R>(f: impl FnOnce(&mut SmallRng) -> R) -> R {
    TLS_RNG.with(|cell| f(&mut cell.borrow_mut()))
}

/// Seeds the process-wide random number generator. Call before building a
/// population to make a run reproducible; a fixed seed plus a fixed
/// configuration yields an identical sequence of generations.
pub fn set_seed(seed: u64) {
    let mut global = GLOBAL_RNG.lock().unwrap();
    *global = SmallRng::seed_from_u64(seed);

    TLS_RNG.with(|cell| {
        *cell.borrow_mut() = SmallRng::seed_from_u64(global.next_u64());
    });
}

/// Temporarily reseeds the thread-local generator for the duration of `f`,
/// then restores its previous state. Intended for tests.
pub fn scoped_seed<R>(seed: u64, f: impl FnOnce() -> R) -> R {
    TLS_RNG.with(|cell| {
        let original = {
            let mut rng = cell.borrow_mut();
            let original = rng.clone();
            *rng = SmallRng::seed_from_u64(seed);
            original
        };

        let result = f();

        *cell.borrow_mut() = original;

        result
    })
}

/// For floating point types, the number will be in the range [0, 1).
/// For integer types, the number will be in the range [0, MAX).
#[inline(always)]
pub fn random<T>() -> T
where
    T: SampleUniform,
    StandardUniform: Distribution<T>,
{
    with_rng(|rng| rng.random())
}

/// Generates a random boolean with the given probability of being true.
#[inline(always)]
pub fn bool(prob: f32) -> bool {
    with_rng(|rng| rng.random_bool(prob.clamp(0.0, 1.0) as f64))
}

/// Generates a random number of type T in the given range.
pub fn range<T>(range: Range<T>) -> T
where
    T: SampleUniform + PartialOrd,
{
    with_rng(|rng| rng.random_range(range))
}

/// Chooses a random item from the given slice.
pub fn choose<T>(items: &[T]) -> &T {
    with_rng(|rng| {
        let index = rng.random_range(0..items.len());
        &items[index]
    })
}

/// Generates a random number from a Gaussian distribution with the given mean
/// and standard deviation. The Box-Muller transform is used to generate the
/// random number.
pub fn gaussian(mean: f64, std_dev: f64) -> f64 {
    with_rng(|rng| {
        let u1: f64 = rng.random();
        let u2: f64 = rng.random();
        let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z0
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random() {
        for _ in 0..100 {
            let value: f64 = random();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn test_range() {
        for _ in 0..100 {
            let value: f64 = range(0.0..100.0);
            assert!((0.0..100.0).contains(&value));
        }
    }

    #[test]
    fn test_choose() {
        for _ in 0..100 {
            let items = vec![1, 2, 3, 4, 5];
            let value = choose(&items);
            assert!(items.contains(value));
        }
    }

    #[test]
    fn test_scoped_seed_repeats() {
        let first = scoped_seed(99, || (0..8).map(|_| random::<u64>()).collect::<Vec<_>>());
        let second = scoped_seed(99, || (0..8).map(|_| random::<u64>()).collect::<Vec<_>>());
        assert_eq!(first, second);
    }
}
