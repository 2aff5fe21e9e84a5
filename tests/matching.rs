mod harness;

use classpool::analysis::{ExecutionTrace, Frame};
use classpool::jvm::code::{opcodes, Instruction, InstructionList};
use classpool::jvm::{Error, MethodAccessFlags};
use classpool::matcher::{
    remove_all_matches, FrameStep, InstructionMatcher, MatcherState, OpcodeStep,
};
use classpool::pool::ClassPool;
use harness::*;

fn instructions(list: &InstructionList) -> Vec<Instruction> {
    list.instructions().cloned().collect()
}

#[test]
fn span_in_the_middle() {
    init_logging();
    let mut list = InstructionList::from(vec![
        Instruction::ILoad(0),
        Instruction::IAdd,
        Instruction::ISub,
        Instruction::IReturn,
    ]);
    let mut matcher = InstructionMatcher::new();
    let add = matcher.add_step(OpcodeStep::new(&[opcodes::IADD])).unwrap();
    let sub = matcher.add_step(OpcodeStep::new(&[opcodes::ISUB])).unwrap();

    let mut cursor = list.cursor();
    assert!(matcher.find(&mut cursor).unwrap());
    assert_eq!(matcher.span(), Some(1..3));
    assert_eq!(cursor.position(), 3);
    assert_eq!(matcher.captured(add), Some(&Instruction::IAdd));
    assert_eq!(matcher.captured(sub), Some(&Instruction::ISub));
}

#[test]
fn remove_all_then_nothing_left() {
    init_logging();
    let mut list = InstructionList::from(vec![
        Instruction::IConst0,
        Instruction::Pop,
        Instruction::ILoad(0),
        Instruction::IConst0,
        Instruction::Pop,
        Instruction::IConst0,
        Instruction::Pop,
        Instruction::IConst0,
        Instruction::IReturn,
    ]);
    let mut matcher = InstructionMatcher::new();
    matcher.add_step(OpcodeStep::new(&[opcodes::ICONST_0])).unwrap();
    matcher.add_step(OpcodeStep::new(&[opcodes::POP])).unwrap();

    assert_eq!(remove_all_matches(&mut matcher, &mut list).unwrap(), 3);
    assert_eq!(
        instructions(&list),
        vec![
            Instruction::ILoad(0),
            Instruction::IConst0,
            Instruction::IReturn
        ]
    );
    assert_eq!(matcher.state(), MatcherState::Idle);

    assert_eq!(remove_all_matches(&mut matcher, &mut list).unwrap(), 0);
    assert_eq!(list.len(), 3);
}

#[test]
fn rewrites_need_a_match() {
    init_logging();
    let mut list = InstructionList::from(vec![Instruction::ILoad(0), Instruction::IReturn]);
    let mut matcher = InstructionMatcher::new();
    let add = matcher.add_step(OpcodeStep::new(&[opcodes::IADD])).unwrap();

    assert!(matches!(
        matcher.add_replacement(add, Some(Instruction::ISub)),
        Err(Error::NotMatched)
    ));

    let mut cursor = list.cursor();
    assert!(!matcher.find(&mut cursor).unwrap());
    assert_eq!(matcher.state(), MatcherState::Exhausted);
    assert!(matches!(matcher.add_removal(add), Err(Error::NotMatched)));
    assert!(matches!(matcher.replace(&mut cursor), Err(Error::NotMatched)));
}

#[test]
fn edits_under_the_span_are_detected() {
    init_logging();
    let mut list = InstructionList::from(vec![
        Instruction::ILoad(0),
        Instruction::ILoad(1),
        Instruction::IAdd,
        Instruction::IReturn,
    ]);
    let mut matcher = InstructionMatcher::new();
    let add = matcher.add_step(OpcodeStep::new(&[opcodes::IADD])).unwrap();

    let mut cursor = list.cursor();
    assert!(matcher.find(&mut cursor).unwrap());
    matcher.add_replacement(add, Some(Instruction::ISub)).unwrap();

    cursor.seek(0);
    assert!(matches!(
        matcher.replace(&mut cursor),
        Err(Error::CursorMoved {
            expected: 3,
            found: 0
        })
    ));

    // Same instruction, new identity
    cursor.seek(2);
    cursor.set(Instruction::IAdd);
    cursor.seek(3);
    assert!(matches!(
        matcher.replace(&mut cursor),
        Err(Error::CaptureMismatch { .. })
    ));
    assert_eq!(instructions(cursor.list())[2], Instruction::IAdd);
}

#[test]
fn replace_and_insert_after() {
    init_logging();
    let mut list = InstructionList::from(vec![
        Instruction::ILoad(0),
        Instruction::ILoad(1),
        Instruction::IAdd,
        Instruction::IReturn,
    ]);
    let mut matcher = InstructionMatcher::new();
    let add = matcher.add_step(OpcodeStep::new(&[opcodes::IADD])).unwrap();

    let mut cursor = list.cursor();
    assert!(matcher.find(&mut cursor).unwrap());
    matcher.add_replacement(add, Some(Instruction::ISub)).unwrap();
    matcher.add_ending_insert(Instruction::INeg);
    assert!(matcher.replace(&mut cursor).unwrap());
    assert_eq!(cursor.position(), 4);
    assert_eq!(matcher.state(), MatcherState::Replaced);
    assert!(matches!(matcher.find(&mut cursor), Err(Error::NotReset)));

    assert_eq!(
        instructions(&list),
        vec![
            Instruction::ILoad(0),
            Instruction::ILoad(1),
            Instruction::ISub,
            Instruction::INeg,
            Instruction::IReturn,
        ]
    );
}

#[test]
fn rewriting_a_pooled_method() {
    init_logging();
    let mut pool = ClassPool::new();
    let class_id = pool.register(
        class("app/Noisy", "java/lang/Object").with_method(
            method("run", "()V", MethodAccessFlags::PUBLIC).with_code(vec![
                Instruction::IConst0,
                Instruction::Pop,
                Instruction::Return,
            ]),
        ),
    );
    pool.process_refs().unwrap();
    let run = pool.class(class_id).unwrap().methods()[0];

    let mut matcher = InstructionMatcher::new();
    matcher.add_step(OpcodeStep::new(&[opcodes::ICONST_0])).unwrap();
    matcher.add_step(OpcodeStep::new(&[opcodes::POP])).unwrap();
    let body = &mut pool.method_mut(run).unwrap().instructions;
    assert_eq!(remove_all_matches(&mut matcher, body).unwrap(), 1);

    let body = &pool.method(run).unwrap().instructions;
    assert_eq!(instructions(body), vec![Instruction::Return]);
}

#[derive(Debug, PartialEq)]
enum Value {
    Param,
    Zero,
    Sum,
}

#[test]
fn steps_can_look_at_frames() {
    init_logging();
    let mut list = InstructionList::from(vec![
        Instruction::ILoad(0),
        Instruction::IConst0,
        Instruction::IAdd,
        Instruction::IReturn,
    ]);
    let ids: Vec<_> = list.iter().map(|node| node.id).collect();

    let mut trace = ExecutionTrace::new();
    trace.insert(ids[0], Frame::new(vec![Value::Param], vec![]));
    trace.insert(ids[1], Frame::new(vec![Value::Param], vec![Value::Param]));
    trace.insert(
        ids[2],
        Frame::new(vec![Value::Param], vec![Value::Param, Value::Zero]),
    );
    trace.insert(ids[3], Frame::new(vec![Value::Param], vec![Value::Sum]));
    assert_eq!(trace.pushed(&list, ids[1]), vec![&Value::Zero]);

    let mut matcher = InstructionMatcher::new();
    matcher.add_step(OpcodeStep::new(&[opcodes::ICONST_0])).unwrap();
    matcher
        .add_step(FrameStep::new(&trace, |insn: &Instruction, frame: &Frame<Value>| {
            *insn == Instruction::IAdd && frame.top() == Some(&Value::Zero)
        }))
        .unwrap();

    assert_eq!(remove_all_matches(&mut matcher, &mut list).unwrap(), 1);
    assert_eq!(
        instructions(&list),
        vec![Instruction::ILoad(0), Instruction::IReturn]
    );

    // Freshly inserted instructions have no frame
    let mut list = InstructionList::from(vec![Instruction::IConst0, Instruction::IAdd]);
    assert_eq!(remove_all_matches(&mut matcher, &mut list).unwrap(), 0);
}
