//! Small bit-set newtypes shared by the registry types.

macro_rules! bit_flags {
    (
        $(#[$meta:meta])*
        pub struct $name:ident: u8 {
            $(
                $(#[$fmeta:meta])*
                const $flag:ident = $value:expr;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(u8);

        impl $name {
            /// No flags set
            pub const NONE: Self = Self(0);
            $(
                $(#[$fmeta])*
                pub const $flag: Self = Self($value);
            )*

            /// Raw bits
            pub const fn bits(self) -> u8 {
                self.0
            }

            /// Build from raw bits, dropping unknown bits
            pub const fn from_bits_truncate(bits: u8) -> Self {
                Self(bits & (0 $(| $value)*))
            }

            /// True when no flag is set
            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// True when every flag in `other` is set
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// True when any flag in `other` is set
            pub const fn intersects(self, other: Self) -> bool {
                self.0 & other.0 != 0
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let mut first = true;
                write!(f, "{}(", stringify!($name))?;
                $(
                    if self.0 & $value != 0 {
                        if !first {
                            write!(f, " | ")?;
                        }
                        write!(f, "{}", stringify!($flag))?;
                        first = false;
                    }
                )*
                if first {
                    write!(f, "NONE")?;
                }
                write!(f, ")")
            }
        }
    };
}
