use std::fmt::Debug;
use std::sync::atomic::{AtomicU16, AtomicU32, AtomicU64, AtomicU8, Ordering};

/// Item type of a shared buffer.
///
/// Every item lives in its own atomic cell, which lets independent workers write
/// disjoint cells through a shared reference. Loads and stores are relaxed: ordering
/// between writers and readers is established by whoever joins the workers.
pub trait Element: Copy + Default + Eq + Debug + Send + Sync + 'static {
    type Atomic: Send + Sync;

    /// Human-readable name of the item type.
    const NAME: &'static str;

    fn zeroed() -> Self::Atomic;
    fn load(cell: &Self::Atomic) -> Self;
    fn store(cell: &Self::Atomic, value: Self);
}

macro_rules! impl_element {
    ($($ty:ty => $atomic:ty),* $(,)?) => {
        $(
            impl Element for $ty {
                type Atomic = $atomic;

                const NAME: &'static str = stringify!($ty);

                #[inline(always)]
                fn zeroed() -> Self::Atomic {
                    <$atomic>::new(0)
                }

                #[inline(always)]
                fn load(cell: &Self::Atomic) -> Self {
                    cell.load(Ordering::Relaxed)
                }

                #[inline(always)]
                fn store(cell: &Self::Atomic, value: Self) {
                    cell.store(value, Ordering::Relaxed)
                }
            }
        )*
    };
}

impl_element!(u8 => AtomicU8, u16 => AtomicU16, u32 => AtomicU32, u64 => AtomicU64);
