//! This module contains the AST of JVM bytecode as it appears inside an editable method body.
//! The representation is slightly different from the usual presentation to make it more
//! convenient to match and rewrite. For instance:
//!
//!   - The "wide" instruction doesn't show up at all, and the short forms of loads and stores
//!     (`iload_0`, ...) are folded into the general form with a local index
//!
//!   - Some instructions (like the branches) get abstracted into one instruction with a field.
//!     This helps with repetitive pattern matches and also simplifies tasks like inverting a
//!     branch condition.
//!
//!   - Members and types are referenced symbolically (by owner name, member name, and
//!     descriptor) instead of through constant pool indices
//!
//!   - Jump targets are [`Label`]s, which are placed in the instruction stream as
//!     pseudo-instructions
//!
//!   - Some instructions (like `jsr`) are just omitted
//!

use super::opcodes::{self, *};
use crate::jvm::{BaseType, BinaryName, FieldType, MethodDescriptor, RefType, UnqualifiedName};
use std::fmt;

/// JVM bytecode instruction (or pseudo-instruction)
#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    Nop,
    AConstNull,
    IConstM1,
    IConst0,
    IConst1,
    IConst2,
    IConst3,
    IConst4,
    IConst5,
    LConst0,
    LConst1,
    FConst0,
    FConst1,
    FConst2,
    DConst0,
    DConst1,
    BiPush(i8),
    SiPush(i16),
    Ldc(Constant), // covers `ldc`, `ldc_w`, and `ldc2_w`
    ILoad(u16),    // covers `iload`, `iload{0,3}`, and `wide iload`
    LLoad(u16),
    FLoad(u16),
    DLoad(u16),
    ALoad(u16),
    IALoad,
    LALoad,
    FALoad,
    DALoad,
    AALoad,
    BALoad,
    CALoad,
    SALoad,
    IStore(u16), // covers `istore`, `istore{0,3}`, and `wide istore`
    LStore(u16),
    FStore(u16),
    DStore(u16),
    AStore(u16),
    IAStore,
    LAStore,
    FAStore,
    DAStore,
    AAStore,
    BAStore,
    CAStore,
    SAStore,
    Pop,
    Pop2,
    Dup,
    DupX1,
    DupX2,
    Dup2,
    Dup2X1,
    Dup2X2,
    Swap,
    IAdd,
    LAdd,
    FAdd,
    DAdd,
    ISub,
    LSub,
    FSub,
    DSub,
    IMul,
    LMul,
    FMul,
    DMul,
    IDiv,
    LDiv,
    FDiv,
    DDiv,
    IRem,
    LRem,
    FRem,
    DRem,
    INeg,
    LNeg,
    FNeg,
    DNeg,
    ISh(ShiftType), // covers `ishr`, `ishl`, and `iushr`
    LSh(ShiftType), // covers `lshr`, `lshl`, and `lushr`
    IAnd,
    LAnd,
    IOr,
    LOr,
    IXor,
    LXor,
    IInc(u16, i16), // covers `iinc` and `wide iinc`
    I2L,
    I2F,
    I2D,
    L2I,
    L2F,
    L2D,
    F2I,
    F2L,
    F2D,
    D2I,
    D2L,
    D2F,
    I2B,
    I2C,
    I2S,
    LCmp,
    FCmp(CompareMode), // covers `fcmpl` and `fcmpg`
    DCmp(CompareMode), // covers `dcmpl` and `dcmpg`
    If(OrdComparison, Label),
    IfICmp(OrdComparison, Label),
    IfACmp(EqComparison, Label),
    IfNull(EqComparison, Label), // covers `ifnull` and `ifnonnull`
    Goto(Label),                 // covers `goto` and `goto_w`
    TableSwitch {
        default: Label,
        low: i32,
        targets: Vec<Label>,
    },
    LookupSwitch {
        default: Label,
        targets: Vec<(i32, Label)>,
    },
    IReturn,
    LReturn,
    FReturn,
    DReturn,
    AReturn,
    Return,
    GetStatic(FieldRef),
    PutStatic(FieldRef),
    GetField(FieldRef),
    PutField(FieldRef),
    Invoke(InvokeType, MethodRef),
    InvokeDynamic(InvokeDynamicRef),
    New(BinaryName),
    NewArray(BaseType),
    ANewArray(RefType<BinaryName>),
    ArrayLength,
    AThrow,
    CheckCast(RefType<BinaryName>),
    InstanceOf(RefType<BinaryName>),
    MonitorEnter,
    MonitorExit,
    MultiANewArray(RefType<BinaryName>, u8),

    /// Pseudo-instruction marking a jump target
    Label(Label),

    /// Pseudo-instruction mapping the code from a label onwards to a source line
    LineNumber(u16, Label),
}

impl Instruction {
    /// Opcode of the instruction
    ///
    /// Pseudo-instructions have no opcode. Instructions that have several encodings report the
    /// general one (`iload` for `iload_0`, `ldc` for `ldc_w`, `goto` for `goto_w`).
    pub fn opcode(&self) -> Option<u8> {
        use Instruction::*;
        let opcode = match self {
            Nop => NOP,
            AConstNull => ACONST_NULL,
            IConstM1 => ICONST_M1,
            IConst0 => ICONST_0,
            IConst1 => ICONST_1,
            IConst2 => ICONST_2,
            IConst3 => ICONST_3,
            IConst4 => ICONST_4,
            IConst5 => ICONST_5,
            LConst0 => LCONST_0,
            LConst1 => LCONST_1,
            FConst0 => FCONST_0,
            FConst1 => FCONST_1,
            FConst2 => FCONST_2,
            DConst0 => DCONST_0,
            DConst1 => DCONST_1,
            BiPush(_) => BIPUSH,
            SiPush(_) => SIPUSH,
            Ldc(Constant::Long(_) | Constant::Double(_)) => LDC2_W,
            Ldc(_) => LDC,
            ILoad(_) => ILOAD,
            LLoad(_) => LLOAD,
            FLoad(_) => FLOAD,
            DLoad(_) => DLOAD,
            ALoad(_) => ALOAD,
            IALoad => IALOAD,
            LALoad => LALOAD,
            FALoad => FALOAD,
            DALoad => DALOAD,
            AALoad => AALOAD,
            BALoad => BALOAD,
            CALoad => CALOAD,
            SALoad => SALOAD,
            IStore(_) => ISTORE,
            LStore(_) => LSTORE,
            FStore(_) => FSTORE,
            DStore(_) => DSTORE,
            AStore(_) => ASTORE,
            IAStore => IASTORE,
            LAStore => LASTORE,
            FAStore => FASTORE,
            DAStore => DASTORE,
            AAStore => AASTORE,
            BAStore => BASTORE,
            CAStore => CASTORE,
            SAStore => SASTORE,
            Pop => POP,
            Pop2 => POP2,
            Dup => DUP,
            DupX1 => DUP_X1,
            DupX2 => DUP_X2,
            Dup2 => DUP2,
            Dup2X1 => DUP2_X1,
            Dup2X2 => DUP2_X2,
            Swap => SWAP,
            IAdd => IADD,
            LAdd => LADD,
            FAdd => FADD,
            DAdd => DADD,
            ISub => ISUB,
            LSub => LSUB,
            FSub => FSUB,
            DSub => DSUB,
            IMul => IMUL,
            LMul => LMUL,
            FMul => FMUL,
            DMul => DMUL,
            IDiv => IDIV,
            LDiv => LDIV,
            FDiv => FDIV,
            DDiv => DDIV,
            IRem => IREM,
            LRem => LREM,
            FRem => FREM,
            DRem => DREM,
            INeg => INEG,
            LNeg => LNEG,
            FNeg => FNEG,
            DNeg => DNEG,
            ISh(ShiftType::Left) => ISHL,
            LSh(ShiftType::Left) => LSHL,
            ISh(ShiftType::ArithmeticRight) => ISHR,
            LSh(ShiftType::ArithmeticRight) => LSHR,
            ISh(ShiftType::LogicalRight) => IUSHR,
            LSh(ShiftType::LogicalRight) => LUSHR,
            IAnd => IAND,
            LAnd => LAND,
            IOr => IOR,
            LOr => LOR,
            IXor => IXOR,
            LXor => LXOR,
            IInc(_, _) => IINC,
            I2L => opcodes::I2L,
            I2F => opcodes::I2F,
            I2D => opcodes::I2D,
            L2I => opcodes::L2I,
            L2F => opcodes::L2F,
            L2D => opcodes::L2D,
            F2I => opcodes::F2I,
            F2L => opcodes::F2L,
            F2D => opcodes::F2D,
            D2I => opcodes::D2I,
            D2L => opcodes::D2L,
            D2F => opcodes::D2F,
            I2B => opcodes::I2B,
            I2C => opcodes::I2C,
            I2S => opcodes::I2S,
            LCmp => LCMP,
            FCmp(CompareMode::L) => FCMPL,
            FCmp(CompareMode::G) => FCMPG,
            DCmp(CompareMode::L) => DCMPL,
            DCmp(CompareMode::G) => DCMPG,
            If(comp, _) => match comp {
                OrdComparison::EQ => IFEQ,
                OrdComparison::NE => IFNE,
                OrdComparison::LT => IFLT,
                OrdComparison::GE => IFGE,
                OrdComparison::GT => IFGT,
                OrdComparison::LE => IFLE,
            },
            IfICmp(comp, _) => match comp {
                OrdComparison::EQ => IF_ICMPEQ,
                OrdComparison::NE => IF_ICMPNE,
                OrdComparison::LT => IF_ICMPLT,
                OrdComparison::GE => IF_ICMPGE,
                OrdComparison::GT => IF_ICMPGT,
                OrdComparison::LE => IF_ICMPLE,
            },
            IfACmp(EqComparison::EQ, _) => IF_ACMPEQ,
            IfACmp(EqComparison::NE, _) => IF_ACMPNE,
            IfNull(EqComparison::EQ, _) => IFNULL,
            IfNull(EqComparison::NE, _) => IFNONNULL,
            Goto(_) => GOTO,
            TableSwitch { .. } => TABLESWITCH,
            LookupSwitch { .. } => LOOKUPSWITCH,
            IReturn => IRETURN,
            LReturn => LRETURN,
            FReturn => FRETURN,
            DReturn => DRETURN,
            AReturn => ARETURN,
            Return => RETURN,
            GetStatic(_) => GETSTATIC,
            PutStatic(_) => PUTSTATIC,
            GetField(_) => GETFIELD,
            PutField(_) => PUTFIELD,
            Invoke(InvokeType::Virtual, _) => INVOKEVIRTUAL,
            Invoke(InvokeType::Special, _) => INVOKESPECIAL,
            Invoke(InvokeType::Static, _) => INVOKESTATIC,
            Invoke(InvokeType::Interface, _) => INVOKEINTERFACE,
            InvokeDynamic(_) => INVOKEDYNAMIC,
            New(_) => NEW,
            NewArray(_) => NEWARRAY,
            ANewArray(_) => ANEWARRAY,
            ArrayLength => ARRAYLENGTH,
            AThrow => ATHROW,
            CheckCast(_) => CHECKCAST,
            InstanceOf(_) => INSTANCEOF,
            MonitorEnter => MONITORENTER,
            MonitorExit => MONITOREXIT,
            MultiANewArray(_, _) => MULTIANEWARRAY,
            Label(_) | LineNumber(_, _) => return None,
        };
        Some(opcode)
    }
}

/// Loadable constant
#[derive(Clone, Debug, PartialEq)]
pub enum Constant {
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Class(RefType<BinaryName>),
}

/// Symbolic reference to a field
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldRef {
    /// Class through which the field is accessed (not necessarily the declaring class)
    pub owner: BinaryName,
    pub name: UnqualifiedName,
    pub descriptor: FieldType<BinaryName>,
}

/// Symbolic reference to a method
///
/// The owner is always a class or interface name. Methods invoked on array types (such as
/// `clone` on `[I`) have no representation here, and class file readers drop such references
/// before building the model.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodRef {
    /// Class through which the method is invoked (not necessarily the declaring class)
    pub owner: BinaryName,
    pub name: UnqualifiedName,
    pub descriptor: MethodDescriptor<BinaryName>,

    /// Is the owner an interface? (ie. is this an `InterfaceMethodref`)
    pub is_interface: bool,
}

/// Call site of an `invokedynamic`
///
/// The bootstrap method is kept opaque: nothing in the class pool resolves through it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InvokeDynamicRef {
    pub name: UnqualifiedName,
    pub descriptor: MethodDescriptor<BinaryName>,
}

/// Jump target
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Possible bit shifts
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum ShiftType {
    Left,
    LogicalRight,
    ArithmeticRight,
}

/// Comparison modes for floating point
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum CompareMode {
    /// -1 on NaN
    L,

    /// 1 on NaN
    G,
}

/// Binary comparison operators available for `int` branches
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum OrdComparison {
    EQ,
    GE,
    GT,
    LE,
    LT,
    NE,
}

/// Equality/inequality comparison operators
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum EqComparison {
    EQ,
    NE,
}

/// Type of method to invoke
///
/// Note: `InvokeDynamic` is kept separate because it does not name a method to resolve.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum InvokeType {
    Virtual,
    Special,
    Static,
    Interface,
}
