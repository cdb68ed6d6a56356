//! End-to-end: MI output through the channel into grouped snapshots

use std::io::{self, Cursor};
use std::sync::Arc;
use std::time::Duration;

use regscope_core::backend::MiBackend;
use regscope_core::channel::OperationChannel;
use regscope_core::collection::RegisterCollection;
use regscope_core::error::RegscopeError;
use regscope_core::types::ThreadId;
use regscope_protocol::MiError;

const SESSION: &str = concat!(
    "=thread-group-added,id=\"i1\"\n",
    "~\"Reading symbols from ./prog...\\n\"\n",
    "(gdb)\n",
    "1^done,register-names=[\"eax\",\"ecx\",\"\",\"eip\",\"st0\",\"xmm0dh\",\"mm3\"]\n",
    "(gdb)\n",
    "2^done,register-values=[{number=\"0\",value=\"0x2a\"},{number=\"1\",value=\"0x0\"},",
    "{number=\"3\",value=\"0x8048000\"},{number=\"5\",value=\"0x0\"},{number=\"6\",value=\"0xff\"}]\n",
    "(gdb)\n",
    "*stopped,reason=\"end-stepping-range\",thread-id=\"1\"\n",
    "3^error,msg=\"Invalid thread id: 5\"\n",
    "(gdb)\n",
);

fn collection() -> RegisterCollection
{
    collection_over(SESSION)
}

fn collection_over(output: &str) -> RegisterCollection
{
    let backend = MiBackend::new(Cursor::new(output.as_bytes().to_vec()), io::sink());
    let channel = OperationChannel::spawn(backend, Duration::from_secs(5)).unwrap();
    RegisterCollection::new(Arc::new(channel))
}

#[test]
fn test_mi_session()
{
    let registers = collection();

    let groups: Vec<_> = registers
        .list_groups()
        .unwrap()
        .into_iter()
        .map(|group| (group.name, group.count))
        .collect();
    assert_eq!(
        groups,
        vec![("CPU".to_string(), 4), ("SSE2".to_string(), 1), ("MMX".to_string(), 1)]
    );

    let snapshot = registers.snapshot(ThreadId(1)).unwrap();
    assert_eq!(snapshot.register("eax").unwrap().content(), Some("0x2a"));
    assert_eq!(snapshot.register("eip").unwrap().content(), Some("0x8048000"));
    // st0 was not reported
    assert_eq!(snapshot.register("st0").unwrap().content(), None);
    assert_eq!(snapshot.register("mm3").unwrap().content(), Some("0xff"));

    let err = registers.snapshot(ThreadId(5)).unwrap_err();
    assert!(matches!(err, RegscopeError::Backend { .. }));

    // The scripted output is exhausted
    assert!(matches!(registers.snapshot(ThreadId(1)), Err(RegscopeError::Disconnected)));
}

#[test]
fn test_value_outside_name_list_fails()
{
    let registers = collection_over(concat!(
        "1^done,register-names=[\"eax\",\"ebx\"]\n",
        "2^done,register-values=[{number=\"0\",value=\"0x0\"},{number=\"1\",value=\"0x1\"},",
        "{number=\"7\",value=\"0x7\"}]\n",
    ));

    assert_eq!(registers.list_groups().unwrap().len(), 1);
    match registers.snapshot(ThreadId(1)) {
        Err(RegscopeError::Protocol(MiError::RegisterOutOfRange { number, registers })) => {
            assert_eq!(number, 7);
            assert_eq!(registers, 2);
        }
        other => panic!("unexpected {other:?}"),
    }
}
