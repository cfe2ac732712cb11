use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use locked_rc::SharedHandle;
use proptest::prelude::*;

struct Instance(Arc<AtomicUsize>);

impl Drop for Instance {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Clone, Debug)]
enum Op {
    /// Clone the handle in the given slot into a new slot.
    Copy(usize),
    /// Make the first slot share the value of the second.
    Assign(usize, usize),
    /// Drop the handle in the given slot.
    Destroy(usize),
    /// Put a fresh absent handle in a new slot.
    Null,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<usize>().prop_map(Op::Copy),
        (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::Assign(a, b)),
        any::<usize>().prop_map(Op::Destroy),
        Just(Op::Null),
    ]
}

proptest! {
    // Property: after every step, each present handle reports exactly as many owners as there
    // are live handles sharing its value, and the value is destroyed once, when the last of
    // those handles goes away.
    #[test]
    fn prop_count_matches_live_handles(ops in proptest::collection::vec(op(), 0..200)) {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut handles = vec![SharedHandle::new(Instance(drops.clone()))];
        let original = handles[0].clone();
        let mut expected = 2;

        for op in ops {
            match op {
                Op::Copy(i) if !handles.is_empty() => {
                    let copy = handles[i % handles.len()].clone();
                    if SharedHandle::ptr_eq(&copy, &original) {
                        expected += 1;
                    }
                    handles.push(copy);
                }
                Op::Assign(i, j) if !handles.is_empty() => {
                    let (i, j) = (i % handles.len(), j % handles.len());
                    let source = handles[j].clone();
                    let was_shared = SharedHandle::ptr_eq(&handles[i], &original);
                    let now_shared = SharedHandle::ptr_eq(&source, &original);
                    handles[i].clone_from(&source);
                    if was_shared != now_shared {
                        if now_shared { expected += 1 } else { expected -= 1 }
                    }
                }
                Op::Destroy(i) if !handles.is_empty() => {
                    let gone = handles.swap_remove(i % handles.len());
                    if SharedHandle::ptr_eq(&gone, &original) {
                        expected -= 1;
                    }
                }
                Op::Null => handles.push(SharedHandle::null()),
                _ => {}
            }

            prop_assert_eq!(original.use_count(), expected);
            for handle in &handles {
                if handle.is_present() {
                    let live = handles
                        .iter()
                        .filter(|other| SharedHandle::ptr_eq(handle, other))
                        .count();
                    let extra = if SharedHandle::ptr_eq(handle, &original) { 1 } else { 0 };
                    prop_assert_eq!(handle.use_count(), live + extra);
                } else {
                    prop_assert_eq!(handle.use_count(), 0);
                }
            }
            prop_assert_eq!(drops.load(Ordering::SeqCst), 0);
        }

        drop(handles);
        prop_assert_eq!(original.use_count(), 1);
        drop(original);
        prop_assert_eq!(drops.load(Ordering::SeqCst), 1);
    }
}
