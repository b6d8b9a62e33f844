#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))]
#![cfg(test)]

use memsim_core::{BlockId, Engine, ErrorKind, Placement};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Alloc(usize, Placement),
    Free(u64),
    Choose(usize, Placement),
}

fn placement() -> impl Strategy<Value = Placement> {
    prop::sample::select(Placement::ALL.to_vec())
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (1..40_usize, placement()).prop_map(|(size, p)| Op::Alloc(size, p)),
        2 => (1..30_u64).prop_map(Op::Free),
        1 => (1..40_usize, placement()).prop_map(|(size, p)| Op::Choose(size, p)),
    ]
}

fn check_state(engine: &Engine) -> Result<(), TestCaseError> {
    let table = engine.table().unwrap();
    prop_assert_eq!(table.validate(), Ok(()));

    let capacity = engine.capacity().unwrap();
    for block in table {
        for addr in block.range() {
            prop_assert_eq!(engine.owner_of(addr).unwrap(), block.id());
        }
    }

    let stats = engine.stats().unwrap();
    let free_blocks = table.iter().filter(|b| b.is_free()).count();
    prop_assert_eq!(stats.total_size, capacity);
    prop_assert_eq!(stats.allocated + stats.free, stats.total_size);
    prop_assert_eq!(stats.external_fragmentation, free_blocks);
    prop_assert_eq!(stats.internal_fragmentation, 0);

    let view = engine.show().unwrap();
    prop_assert_eq!(view.occupancy().len(), capacity);
    Ok(())
}

proptest! {
    #[test]
    fn random_sequences_keep_invariants(
        capacity in 1..120_usize,
        ops in prop::collection::vec(op(), 0..60),
    ) {
        let mut engine = Engine::new();
        engine.init(capacity).unwrap();
        let mut last_id = 0;

        for op in ops {
            let before = engine.table().unwrap().clone();
            match op {
                Op::Alloc(size, placement) => match engine.alloc(size, placement) {
                    Ok(a) => {
                        prop_assert!(a.id.get() > last_id);
                        last_id = a.id.get();
                        prop_assert!(engine.table().unwrap().len() <= before.len() + 1);
                    }
                    Err(err) => {
                        prop_assert_eq!(err.kind(), ErrorKind::NoFit);
                        prop_assert!(before.candidates(size).next().is_none());
                        prop_assert_eq!(engine.table().unwrap(), &before);
                    }
                },
                Op::Free(raw) => match engine.free(BlockId::new(raw)) {
                    Ok(freed) => prop_assert_eq!(freed.id.get(), raw),
                    Err(err) => {
                        prop_assert_eq!(err.kind(), ErrorKind::NotFound);
                        prop_assert_eq!(engine.table().unwrap(), &before);
                    }
                },
                Op::Choose(size, placement) => {
                    let chosen = engine.choose_block(size, placement);
                    prop_assert_eq!(engine.table().unwrap(), &before);
                    if let Ok(choice) = chosen {
                        prop_assert!(choice.block.is_free());
                        prop_assert!(choice.block.size() >= size);
                    }
                }
            }
            check_state(&engine)?;
        }
    }

    #[test]
    fn choice_predicts_allocation(
        sizes in prop::collection::vec(1..20_usize, 1..10),
        frees in prop::collection::vec(any::<prop::sample::Index>(), 0..5),
        request in 1..30_usize,
        placement in placement(),
    ) {
        let mut engine = Engine::new();
        engine.init(200).unwrap();
        let ids: Vec<_> = sizes
            .iter()
            .map(|&size| engine.alloc(size, Placement::FirstFit).unwrap().id)
            .collect();
        for index in frees {
            // Freeing the same id twice is rejected and harmless.
            let _ = engine.free(*index.get(&ids));
        }

        match engine.choose_block(request, placement) {
            Ok(choice) => {
                let a = engine.alloc(request, placement).unwrap();
                prop_assert_eq!(a.start, choice.block.start());
            }
            Err(err) => {
                prop_assert_eq!(err.kind(), ErrorKind::NoFit);
                prop_assert_eq!(
                    engine.alloc(request, placement).unwrap_err().kind(),
                    ErrorKind::NoFit
                );
            }
        }
    }
}
