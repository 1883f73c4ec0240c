//! Opcodes of the instructions that can appear in a method body
//!
//! Only the canonical forms show up here. The short forms (like `iload_0`), the wide forms (like
//! `goto_w` and `ldc_w`), and the `wide` prefix are encoding details: an encoder picks them when
//! the method body is turned back into bytes.

use std::fmt;

/// Kind of node needed to carry an instruction
///
/// Every real opcode belongs to exactly one kind. The last three kinds are pseudo-instructions:
/// they occupy a position in an instruction list but have no opcode.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum InsnKind {
    /// No operand (eg. `iadd`, `areturn`)
    Simple,
    /// Single integer operand (`bipush`, `sipush`, `newarray`)
    Int,
    /// Local variable index operand (eg. `iload`, `astore`, `ret`)
    Var,
    /// Class or array type operand (`new`, `anewarray`, `checkcast`, `instanceof`)
    Type,
    /// Field reference operand
    Field,
    /// Method reference operand
    Method,
    /// `invokedynamic`
    InvokeDynamic,
    /// Conditional and unconditional jumps (and `jsr`)
    Jump,
    /// `ldc`
    Ldc,
    /// `iinc`
    IInc,
    /// `tableswitch`
    TableSwitch,
    /// `lookupswitch`
    LookupSwitch,
    /// `multianewarray`
    MultiANewArray,
    Label,
    Frame,
    LineNumber,
}

impl InsnKind {
    /// Does this kind correspond to a pseudo-instruction?
    pub fn is_pseudo(self) -> bool {
        matches!(self, InsnKind::Label | InsnKind::Frame | InsnKind::LineNumber)
    }
}

/// Groups of opcodes that share an operand shape and can be swapped for one another in place
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum OpcodeFamily {
    /// `getstatic`, `putstatic`, `getfield`, `putfield`
    FieldAccess,
    /// `invokevirtual`, `invokespecial`, `invokestatic`, `invokeinterface`
    Invoke,
    /// `ifeq`, `ifne`, `iflt`, `ifge`, `ifgt`, `ifle`
    UnaryBranch,
    /// `if_icmpeq` through `if_icmple`
    IntCompareBranch,
    /// `if_acmpeq`, `if_acmpne`
    RefCompareBranch,
    /// `ifnull`, `ifnonnull`
    NullBranch,
    /// `iload`, `lload`, `fload`, `dload`, `aload`
    Load,
    /// `istore`, `lstore`, `fstore`, `dstore`, `astore`
    Store,
    /// `checkcast`, `instanceof`
    TypeCheck,
}

/// JVM instruction opcode
///
/// Values can only be obtained from the associated constants or from [`Opcode::from_u8`], so
/// every `Opcode` is a real instruction of a known [`InsnKind`].
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Opcode(u8);

macro_rules! opcodes {
    ($($name:ident = $code:literal => $kind:ident, $mnemonic:literal;)*) => {
        impl Opcode {
            $(
                pub const $name: Opcode = Opcode($code);
            )*

            /// Look up the opcode with the given numeric value
            pub fn from_u8(code: u8) -> Option<Opcode> {
                match code {
                    $($code => Some(Opcode::$name),)*
                    _ => None,
                }
            }

            /// Kind of node that carries this opcode
            pub fn kind(self) -> InsnKind {
                match self.0 {
                    $($code => InsnKind::$kind,)*
                    other => unreachable!("opcode {} was never constructed", other),
                }
            }

            /// Lowercase name, as it appears in the JVM specification
            pub fn mnemonic(self) -> &'static str {
                match self.0 {
                    $($code => $mnemonic,)*
                    other => unreachable!("opcode {} was never constructed", other),
                }
            }
        }
    };
}

opcodes! {
    NOP = 0 => Simple, "nop";
    ACONST_NULL = 1 => Simple, "aconst_null";
    ICONST_M1 = 2 => Simple, "iconst_m1";
    ICONST_0 = 3 => Simple, "iconst_0";
    ICONST_1 = 4 => Simple, "iconst_1";
    ICONST_2 = 5 => Simple, "iconst_2";
    ICONST_3 = 6 => Simple, "iconst_3";
    ICONST_4 = 7 => Simple, "iconst_4";
    ICONST_5 = 8 => Simple, "iconst_5";
    LCONST_0 = 9 => Simple, "lconst_0";
    LCONST_1 = 10 => Simple, "lconst_1";
    FCONST_0 = 11 => Simple, "fconst_0";
    FCONST_1 = 12 => Simple, "fconst_1";
    FCONST_2 = 13 => Simple, "fconst_2";
    DCONST_0 = 14 => Simple, "dconst_0";
    DCONST_1 = 15 => Simple, "dconst_1";
    BIPUSH = 16 => Int, "bipush";
    SIPUSH = 17 => Int, "sipush";
    LDC = 18 => Ldc, "ldc";
    ILOAD = 21 => Var, "iload";
    LLOAD = 22 => Var, "lload";
    FLOAD = 23 => Var, "fload";
    DLOAD = 24 => Var, "dload";
    ALOAD = 25 => Var, "aload";
    IALOAD = 46 => Simple, "iaload";
    LALOAD = 47 => Simple, "laload";
    FALOAD = 48 => Simple, "faload";
    DALOAD = 49 => Simple, "daload";
    AALOAD = 50 => Simple, "aaload";
    BALOAD = 51 => Simple, "baload";
    CALOAD = 52 => Simple, "caload";
    SALOAD = 53 => Simple, "saload";
    ISTORE = 54 => Var, "istore";
    LSTORE = 55 => Var, "lstore";
    FSTORE = 56 => Var, "fstore";
    DSTORE = 57 => Var, "dstore";
    ASTORE = 58 => Var, "astore";
    IASTORE = 79 => Simple, "iastore";
    LASTORE = 80 => Simple, "lastore";
    FASTORE = 81 => Simple, "fastore";
    DASTORE = 82 => Simple, "dastore";
    AASTORE = 83 => Simple, "aastore";
    BASTORE = 84 => Simple, "bastore";
    CASTORE = 85 => Simple, "castore";
    SASTORE = 86 => Simple, "sastore";
    POP = 87 => Simple, "pop";
    POP2 = 88 => Simple, "pop2";
    DUP = 89 => Simple, "dup";
    DUP_X1 = 90 => Simple, "dup_x1";
    DUP_X2 = 91 => Simple, "dup_x2";
    DUP2 = 92 => Simple, "dup2";
    DUP2_X1 = 93 => Simple, "dup2_x1";
    DUP2_X2 = 94 => Simple, "dup2_x2";
    SWAP = 95 => Simple, "swap";
    IADD = 96 => Simple, "iadd";
    LADD = 97 => Simple, "ladd";
    FADD = 98 => Simple, "fadd";
    DADD = 99 => Simple, "dadd";
    ISUB = 100 => Simple, "isub";
    LSUB = 101 => Simple, "lsub";
    FSUB = 102 => Simple, "fsub";
    DSUB = 103 => Simple, "dsub";
    IMUL = 104 => Simple, "imul";
    LMUL = 105 => Simple, "lmul";
    FMUL = 106 => Simple, "fmul";
    DMUL = 107 => Simple, "dmul";
    IDIV = 108 => Simple, "idiv";
    LDIV = 109 => Simple, "ldiv";
    FDIV = 110 => Simple, "fdiv";
    DDIV = 111 => Simple, "ddiv";
    IREM = 112 => Simple, "irem";
    LREM = 113 => Simple, "lrem";
    FREM = 114 => Simple, "frem";
    DREM = 115 => Simple, "drem";
    INEG = 116 => Simple, "ineg";
    LNEG = 117 => Simple, "lneg";
    FNEG = 118 => Simple, "fneg";
    DNEG = 119 => Simple, "dneg";
    ISHL = 120 => Simple, "ishl";
    LSHL = 121 => Simple, "lshl";
    ISHR = 122 => Simple, "ishr";
    LSHR = 123 => Simple, "lshr";
    IUSHR = 124 => Simple, "iushr";
    LUSHR = 125 => Simple, "lushr";
    IAND = 126 => Simple, "iand";
    LAND = 127 => Simple, "land";
    IOR = 128 => Simple, "ior";
    LOR = 129 => Simple, "lor";
    IXOR = 130 => Simple, "ixor";
    LXOR = 131 => Simple, "lxor";
    IINC = 132 => IInc, "iinc";
    I2L = 133 => Simple, "i2l";
    I2F = 134 => Simple, "i2f";
    I2D = 135 => Simple, "i2d";
    L2I = 136 => Simple, "l2i";
    L2F = 137 => Simple, "l2f";
    L2D = 138 => Simple, "l2d";
    F2I = 139 => Simple, "f2i";
    F2L = 140 => Simple, "f2l";
    F2D = 141 => Simple, "f2d";
    D2I = 142 => Simple, "d2i";
    D2L = 143 => Simple, "d2l";
    D2F = 144 => Simple, "d2f";
    I2B = 145 => Simple, "i2b";
    I2C = 146 => Simple, "i2c";
    I2S = 147 => Simple, "i2s";
    LCMP = 148 => Simple, "lcmp";
    FCMPL = 149 => Simple, "fcmpl";
    FCMPG = 150 => Simple, "fcmpg";
    DCMPL = 151 => Simple, "dcmpl";
    DCMPG = 152 => Simple, "dcmpg";
    IFEQ = 153 => Jump, "ifeq";
    IFNE = 154 => Jump, "ifne";
    IFLT = 155 => Jump, "iflt";
    IFGE = 156 => Jump, "ifge";
    IFGT = 157 => Jump, "ifgt";
    IFLE = 158 => Jump, "ifle";
    IF_ICMPEQ = 159 => Jump, "if_icmpeq";
    IF_ICMPNE = 160 => Jump, "if_icmpne";
    IF_ICMPLT = 161 => Jump, "if_icmplt";
    IF_ICMPGE = 162 => Jump, "if_icmpge";
    IF_ICMPGT = 163 => Jump, "if_icmpgt";
    IF_ICMPLE = 164 => Jump, "if_icmple";
    IF_ACMPEQ = 165 => Jump, "if_acmpeq";
    IF_ACMPNE = 166 => Jump, "if_acmpne";
    GOTO = 167 => Jump, "goto";
    JSR = 168 => Jump, "jsr";
    RET = 169 => Var, "ret";
    TABLESWITCH = 170 => TableSwitch, "tableswitch";
    LOOKUPSWITCH = 171 => LookupSwitch, "lookupswitch";
    IRETURN = 172 => Simple, "ireturn";
    LRETURN = 173 => Simple, "lreturn";
    FRETURN = 174 => Simple, "freturn";
    DRETURN = 175 => Simple, "dreturn";
    ARETURN = 176 => Simple, "areturn";
    RETURN = 177 => Simple, "return";
    GETSTATIC = 178 => Field, "getstatic";
    PUTSTATIC = 179 => Field, "putstatic";
    GETFIELD = 180 => Field, "getfield";
    PUTFIELD = 181 => Field, "putfield";
    INVOKEVIRTUAL = 182 => Method, "invokevirtual";
    INVOKESPECIAL = 183 => Method, "invokespecial";
    INVOKESTATIC = 184 => Method, "invokestatic";
    INVOKEINTERFACE = 185 => Method, "invokeinterface";
    INVOKEDYNAMIC = 186 => InvokeDynamic, "invokedynamic";
    NEW = 187 => Type, "new";
    NEWARRAY = 188 => Int, "newarray";
    ANEWARRAY = 189 => Type, "anewarray";
    ARRAYLENGTH = 190 => Simple, "arraylength";
    ATHROW = 191 => Simple, "athrow";
    CHECKCAST = 192 => Type, "checkcast";
    INSTANCEOF = 193 => Type, "instanceof";
    MONITORENTER = 194 => Simple, "monitorenter";
    MONITOREXIT = 195 => Simple, "monitorexit";
    MULTIANEWARRAY = 197 => MultiANewArray, "multianewarray";
    IFNULL = 198 => Jump, "ifnull";
    IFNONNULL = 199 => Jump, "ifnonnull";
}

impl Opcode {
    /// Numeric value of the opcode
    pub fn code(self) -> u8 {
        self.0
    }

    /// Family of interchangeable opcodes this opcode belongs to (if any)
    pub fn family(self) -> Option<OpcodeFamily> {
        let family = match self.0 {
            178..=181 => OpcodeFamily::FieldAccess,
            182..=185 => OpcodeFamily::Invoke,
            153..=158 => OpcodeFamily::UnaryBranch,
            159..=164 => OpcodeFamily::IntCompareBranch,
            165 | 166 => OpcodeFamily::RefCompareBranch,
            198 | 199 => OpcodeFamily::NullBranch,
            21..=25 => OpcodeFamily::Load,
            54..=58 => OpcodeFamily::Store,
            192 | 193 => OpcodeFamily::TypeCheck,
            _ => return None,
        };
        Some(family)
    }

    /// Can `self` be replaced by `other` without changing the shape of the node?
    pub fn is_interchangeable_with(self, other: Opcode) -> bool {
        self == other || matches!((self.family(), other.family()), (Some(a), Some(b)) if a == b)
    }
}

impl fmt::Debug for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn kinds_cover_every_known_opcode() {
        let known: Vec<Opcode> = (0..=u8::MAX).filter_map(Opcode::from_u8).collect();
        assert_eq!(known.len(), 157);
        for opcode in known {
            assert!(!opcode.kind().is_pseudo(), "{:?} has a pseudo kind", opcode);
            assert_eq!(Opcode::from_u8(opcode.code()), Some(opcode));
        }
    }

    #[test]
    fn short_and_wide_forms_are_absent() {
        for code in [19u8, 20, 26, 45, 59, 78, 196, 200, 201, 255] {
            assert_eq!(Opcode::from_u8(code), None, "opcode {} should not exist", code);
        }
    }

    #[test]
    fn families() {
        assert!(Opcode::GETFIELD.is_interchangeable_with(Opcode::PUTSTATIC));
        assert!(Opcode::INVOKEVIRTUAL.is_interchangeable_with(Opcode::INVOKEINTERFACE));
        assert!(Opcode::IFEQ.is_interchangeable_with(Opcode::IFLE));
        assert!(!Opcode::IFEQ.is_interchangeable_with(Opcode::IF_ICMPEQ));
        assert!(!Opcode::GOTO.is_interchangeable_with(Opcode::JSR));
        assert!(!Opcode::NEW.is_interchangeable_with(Opcode::CHECKCAST));
        assert!(Opcode::IADD.is_interchangeable_with(Opcode::IADD));
        assert!(!Opcode::IADD.is_interchangeable_with(Opcode::ISUB));
    }

    #[test]
    fn mnemonics() {
        assert_eq!(format!("{:?}", Opcode::INVOKEDYNAMIC), "invokedynamic");
        assert_eq!(Opcode::IF_ACMPNE.to_string(), "if_acmpne");
        assert_eq!(Opcode::MULTIANEWARRAY.kind(), InsnKind::MultiANewArray);
    }
}
