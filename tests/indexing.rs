mod harness;

use classpool::jvm::code::{Constant, Instruction, InvokeType};
use classpool::jvm::model::ClassModel;
use classpool::jvm::{ArrayType, BaseType, Error, FieldAccessFlags, MethodAccessFlags, RefType};
use classpool::pool::{ClassPool, GraphState, IndexStats, Settings};
use harness::*;

fn counter() -> ClassModel {
    class("app/Counter", "java/lang/Object")
        .with_field(field("count", "I", FieldAccessFlags::PRIVATE))
        .with_method(
            method("increment", "()V", MethodAccessFlags::PUBLIC).with_code(vec![
                Instruction::ALoad(0),
                Instruction::ALoad(0),
                Instruction::GetField(field_ref("app/Counter", "count", "I")),
                Instruction::IConst1,
                Instruction::IAdd,
                Instruction::PutField(field_ref("app/Counter", "count", "I")),
                Instruction::Return,
            ]),
        )
}

fn main_class() -> ClassModel {
    class("app/Main", "java/lang/Object")
        .with_field(field("counters", "[Lapp/Counter;", FieldAccessFlags::PRIVATE))
        .with_method(
            method(
                "main",
                "([Ljava/lang/String;)V",
                MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
            )
            .with_code(vec![
                Instruction::New(name("app/Counter")),
                Instruction::Dup,
                Instruction::Invoke(
                    InvokeType::Special,
                    classpool::jvm::code::MethodRef {
                        owner: name("app/Counter"),
                        name: member("<init>"),
                        descriptor: method_descriptor("()V"),
                        is_interface: false,
                    },
                ),
                Instruction::Dup,
                invoke(InvokeType::Virtual, "app/Counter", "increment", "()V"),
                invoke(InvokeType::Virtual, "app/Counter", "increment", "()V"),
                Instruction::CheckCast(RefType::Object(name("java/lang/Object"))),
                Instruction::Ldc(Constant::String(String::from("done"))),
                invoke(
                    InvokeType::Static,
                    "app/Log",
                    "info",
                    "(Ljava/lang/String;)V",
                ),
                Instruction::Return,
            ]),
        )
}

#[test]
fn references_are_indexed() {
    init_logging();
    let mut pool = ClassPool::new();
    let counter = pool.register(counter());
    let main = pool.register(main_class());
    let stats = pool.process_refs().unwrap();

    assert_eq!(pool.state(), GraphState::Indexed);
    assert_eq!(
        stats,
        IndexStats {
            calls: 2,
            field_reads: 1,
            field_writes: 1,
            type_refs: 1,
            strings: 1,
            field_types: 1,
            skipped: 3,
        }
    );

    let count = pool.class(counter).unwrap().fields()[0];
    let increment = pool.class(counter).unwrap().methods()[0];
    let entry = pool.class(main).unwrap().methods()[0];
    let counters = pool.class(main).unwrap().fields()[0];

    let count = pool.field(count).unwrap();
    assert_eq!(count.read_refs(), &[increment]);
    assert_eq!(count.write_refs(), &[increment]);

    // One edge per call site
    assert_eq!(pool.method(entry).unwrap().refs_out(), &[increment, increment]);
    assert_eq!(pool.method(increment).unwrap().refs_in(), &[entry, entry]);
    assert_eq!(
        pool.method(increment).unwrap().field_read_refs(),
        &[count.id()]
    );

    let counter_class = pool.class(counter).unwrap();
    assert!(counter_class.method_type_refs().contains(&entry));
    assert!(counter_class.method_type_refs().contains(&increment));
    assert_eq!(counter_class.field_type_refs(), &[counters]);
    assert!(pool.method(entry).unwrap().class_refs().contains(&counter));
    assert_eq!(pool.class(main).unwrap().strings(), &[String::from("done")]);
}

#[test]
fn indexing_is_idempotent() {
    init_logging();
    let mut pool = ClassPool::new();
    let counter = pool.register(counter());
    pool.register(main_class());
    let first = pool.process_refs().unwrap();
    let increment = pool.class(counter).unwrap().methods()[0];
    let before = pool.method(increment).unwrap().refs_in().to_vec();

    let second = pool.index_refs().unwrap();
    assert_eq!(first, second);
    assert_eq!(pool.method(increment).unwrap().refs_in(), before.as_slice());
}

#[test]
fn settings_limit_what_is_indexed() {
    init_logging();
    let mut pool = ClassPool::with_settings(Settings::members_only());
    let counter = pool.register(counter());
    let main = pool.register(main_class());
    let stats = pool.process_refs().unwrap();

    assert_eq!(stats.calls, 2);
    assert_eq!(stats.type_refs, 0);
    assert_eq!(stats.strings, 0);
    assert_eq!(stats.field_types, 0);
    assert!(pool.class(main).unwrap().strings().is_empty());
    assert!(pool.class(counter).unwrap().field_type_refs().is_empty());
}

#[test]
fn indexing_requires_linking() {
    init_logging();
    let mut pool = ClassPool::new();
    pool.register(counter());
    assert!(matches!(pool.index_refs(), Err(Error::GraphNotLinked)));

    pool.link().unwrap();
    pool.index_refs().unwrap();
    pool.register(main_class());
    assert!(matches!(pool.index_refs(), Err(Error::GraphNotLinked)));
}

#[test]
fn unregister_prunes_references() {
    init_logging();
    let mut pool = ClassPool::new();
    let counter = pool.register(counter());
    let main = pool.register(main_class());
    pool.process_refs().unwrap();
    let entry = pool.class(main).unwrap().methods()[0];
    let increment = pool.class(counter).unwrap().methods()[0];

    pool.unregister(main).unwrap();
    assert_eq!(pool.state(), GraphState::Linked);
    assert!(pool.method(entry).is_none());
    assert!(pool.method(increment).unwrap().refs_in().is_empty());
    let counter_class = pool.class(counter).unwrap();
    assert!(!counter_class.method_type_refs().contains(&entry));
    assert!(counter_class.field_type_refs().is_empty());

    pool.unregister(counter).unwrap();
    assert!(pool.is_empty());
}

#[test]
fn edited_bodies_are_reindexed() {
    init_logging();
    let mut pool = ClassPool::new();
    let counter = pool.register(counter());
    let main = pool.register(main_class());
    pool.process_refs().unwrap();

    let entry = pool.class(main).unwrap().methods()[0];
    let increment = pool.class(counter).unwrap().methods()[0];
    pool.method_mut(entry).unwrap().instructions = vec![Instruction::Return].into();
    assert_eq!(pool.state(), GraphState::Linked);
    pool.index_refs().unwrap();
    assert_eq!(pool.state(), GraphState::Indexed);
    assert!(pool.method(increment).unwrap().refs_in().is_empty());

    let models = pool.into_models();
    assert_eq!(models.len(), 2);
    assert_eq!(models[1].methods[0].instructions.len(), 1);
}

#[test]
fn editing_a_body_invalidates_the_index() {
    init_logging();
    let mut pool = ClassPool::new();
    let class_id = pool.register(
        class("A", "java/lang/Object")
            .with_method(method("g", "()V", MethodAccessFlags::PUBLIC))
            .with_method(
                method("f", "()V", MethodAccessFlags::PUBLIC).with_code(vec![
                    Instruction::ALoad(0),
                    invoke(InvokeType::Virtual, "A", "g", "()V"),
                    Instruction::Return,
                ]),
            ),
    );
    pool.process_refs().unwrap();
    let g = pool.class(class_id).unwrap().methods()[0];
    let f = pool.class(class_id).unwrap().methods()[1];
    assert_eq!(pool.method(f).unwrap().refs_out(), &[g]);

    pool.method_mut(f).unwrap().instructions = vec![Instruction::Return].into();
    assert_ne!(pool.state(), GraphState::Indexed);
    assert!(pool.resolver().is_ok());

    pool.index_refs().unwrap();
    assert!(pool.method(f).unwrap().refs_out().is_empty());
    assert!(pool.method(g).unwrap().refs_in().is_empty());
}

#[test]
fn array_instructions_reference_their_element_class() {
    init_logging();
    let mut pool = ClassPool::new();
    let foo = pool.register(class("app/Foo", "java/lang/Object"));
    let user = pool.register(
        class("app/User", "java/lang/Object").with_method(
            method("run", "()V", MethodAccessFlags::PUBLIC).with_code(vec![
                Instruction::IConst1,
                Instruction::ANewArray(RefType::Object(name("app/Foo"))),
                Instruction::Pop,
                Instruction::IConst1,
                Instruction::IConst1,
                Instruction::MultiANewArray(
                    RefType::ObjectArray(ArrayType {
                        additional_dimensions: 1,
                        element_type: name("app/Foo"),
                    }),
                    2,
                ),
                Instruction::InstanceOf(RefType::PrimitiveArray(ArrayType {
                    additional_dimensions: 0,
                    element_type: BaseType::Int,
                })),
                Instruction::Pop,
                Instruction::Return,
            ]),
        ),
    );
    let stats = pool.process_refs().unwrap();
    assert_eq!(stats.type_refs, 2);
    assert_eq!(stats.skipped, 0);

    let run = pool.class(user).unwrap().methods()[0];
    assert_eq!(pool.method(run).unwrap().class_refs(), &[foo, foo]);
    assert_eq!(pool.class(foo).unwrap().method_type_refs(), &[run, run]);
}
