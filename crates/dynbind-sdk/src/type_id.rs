//! Stable type identifiers
//!
//! Every type the native object model exposes is named by a 128-bit id that
//! stays stable across builds. The catalog never compares Rust types, only
//! these ids.

use std::fmt;

/// 128-bit stable type identifier.
///
/// Displays in the braced `{XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX}` form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct TypeId(u128);

const FNV_OFFSET: u128 = 0x6c62_272e_07bb_0142_62b8_2175_6295_c58d;
const FNV_PRIME: u128 = 0x0000_0000_0100_0000_0000_0000_0000_013b;

impl TypeId {
    /// The null id. Never assigned to a real type.
    pub const NULL: TypeId = TypeId(0);

    /// Create from raw bits
    pub const fn from_u128(bits: u128) -> Self {
        TypeId(bits)
    }

    /// Raw bits
    pub const fn as_u128(self) -> u128 {
        self.0
    }

    /// Derive a deterministic id from a type name (128-bit FNV-1a).
    ///
    /// Useful for native models that have no id scheme of their own.
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = FNV_OFFSET;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u128;
            hash = hash.wrapping_mul(FNV_PRIME);
            i += 1;
        }
        TypeId(hash)
    }

    /// Check for the null id
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        write!(
            f,
            "{{{:08X}-{:04X}-{:04X}-{:04X}-{:012X}}}",
            (v >> 96) as u32,
            (v >> 80) as u16,
            (v >> 64) as u16,
            (v >> 48) as u16,
            v & 0xFFFF_FFFF_FFFF
        )
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self)
    }
}

/// Well-known ids for the primitive, string and math types.
///
/// `INT` and `UINT` are platform aliases with their own ids; they carry the
/// same width as `S32`/`U32`.
pub mod builtin {
    use super::TypeId;

    /// `void`
    pub const VOID: TypeId = TypeId::from_u128(0xC0F1AFAD_5CB3_450E_B0F5_ADB5D46B0E22);
    /// `bool`
    pub const BOOL: TypeId = TypeId::from_u128(0xA0CA880C_AFE4_43CB_926C_59AC48496112);
    /// `i8`
    pub const S8: TypeId = TypeId::from_u128(0x58422C0E_1E47_4854_98E6_34098F6FE12D);
    /// `i16`
    pub const S16: TypeId = TypeId::from_u128(0xB8A56D56_A10D_4DCE_9F63_405EE243DD3C);
    /// `i32`
    pub const S32: TypeId = TypeId::from_u128(0x8F24B9AD_7C51_46CF_B2F8_277356957325);
    /// `i64`
    pub const S64: TypeId = TypeId::from_u128(0x70D8A282_A1EA_462D_9D04_51EDE81FAC2F);
    /// Platform `int`
    pub const INT: TypeId = TypeId::from_u128(0x72039442_EB38_4D42_A1AD_CB68F7E0EEF6);
    /// `u8`
    pub const U8: TypeId = TypeId::from_u128(0x72B9409A_7D1A_4831_9CFE_FCB3FADD3426);
    /// `u16`
    pub const U16: TypeId = TypeId::from_u128(0xECA0B403_C4F8_4B86_95FC_81688D046E40);
    /// `u32`
    pub const U32: TypeId = TypeId::from_u128(0x43DA906B_7DEF_4CA8_9790_854106D3F983);
    /// `u64`
    pub const U64: TypeId = TypeId::from_u128(0xD6597933_47CD_4FC8_B911_63F3E2B0993A);
    /// Platform `unsigned int`
    pub const UINT: TypeId = TypeId::from_u128(0x18F6C2D6_5B86_4E44_9A3E_0B8BB46C5C04);
    /// `f32`
    pub const F32: TypeId = TypeId::from_u128(0xEA2C3E90_AFBE_44D4_A90D_FAAF79BAF93D);
    /// `f64`
    pub const F64: TypeId = TypeId::from_u128(0x110C4B14_11A8_4E9D_8638_5051013A56AC);
    /// Owned string
    pub const STRING: TypeId = TypeId::from_u128(0x03AAAB3F_5C47_5A66_9EBC_D5FA4DB353C9);
    /// Borrowed C string
    pub const CSTR: TypeId = TypeId::from_u128(0x9EBEB2A9_11F3_4C8E_8E4B_31A1E1F3C3D7);
    /// 3-float vector
    pub const VECTOR3: TypeId = TypeId::from_u128(0x8379EB7D_01FA_4538_B64B_A6543B4BE73D);
    /// 4-float quaternion
    pub const QUATERNION: TypeId = TypeId::from_u128(0x73103120_3DD3_4873_BAB3_9713FA2804FB);
}
