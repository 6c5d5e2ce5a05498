/// A 1-based index where zero means "unset".
///
/// `Default` yields the unset value, so zero-initialised descriptors start
/// out invalid without any extra bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SafeIndex(usize);

impl SafeIndex {
    pub const NONE: SafeIndex = SafeIndex(0);

    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index + 1)
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_valid_for(self, len: usize) -> bool {
        self.0 > 0 && self.0 <= len
    }

    #[inline]
    pub fn get(self) -> Option<usize> {
        self.0.checked_sub(1)
    }

    /// Zero-based index.
    ///
    /// # Panics
    ///
    /// Panics when the index is unset.
    #[inline]
    pub fn index(self) -> usize {
        assert!(self.is_valid(), "dereferenced an unset handle");
        self.0 - 1
    }
}

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(pub(crate) $crate::arena::SafeIndex);

        impl $name {
            #[inline]
            pub(crate) const fn new(index: usize) -> Self {
                Self($crate::arena::SafeIndex::new(index))
            }

            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0.is_valid()
            }

            #[inline]
            pub(crate) fn index(self) -> usize {
                self.0.index()
            }
        }
    };
}

pub(crate) use define_handle;
