#![cfg(feature = "unique")]

use std::thread;

use locked_rc::{SharedHandle, UniqueHandle};

#[test]
fn unique_handle_gives_mutable_access() {
    let mut unique = UniqueHandle::new(vec![1, 2]);
    unique.push(3);
    assert_eq!(*unique, vec![1, 2, 3]);
    assert_eq!(unique.into_inner(), vec![1, 2, 3]);
}

#[test]
fn ownership_transfers_into_shared_tracking() {
    let mut unique = UniqueHandle::new(String::from("owned"));
    unique.push('!');
    let address = &*unique as *const String;

    let shared = unique.into_shared();
    assert_eq!(shared.use_count(), 1);
    assert_eq!(&*shared as *const String, address);

    let copy = shared.clone();
    assert_eq!(*copy, "owned!");
    assert_eq!(shared.use_count(), 2);
}

#[test]
fn only_a_sole_owner_becomes_unique() {
    let shared = SharedHandle::new(5);
    let copy = shared.clone();

    let shared = SharedHandle::into_unique(shared).unwrap_err();
    drop(copy);

    let mut unique = SharedHandle::into_unique(shared).unwrap();
    *unique += 1;
    let shared: SharedHandle<i32> = unique.into();
    assert_eq!(*shared, 6);

    assert!(SharedHandle::into_unique(SharedHandle::<i32>::null()).is_err());
}

#[test]
fn unique_boxes_keep_their_allocation() {
    let unique: UniqueHandle<str> = UniqueHandle::from(Box::<str>::from("slice"));
    let boxed = unique.into_box();
    assert_eq!(&*boxed, "slice");
}

#[test]
fn unique_handles_move_across_threads_without_sync() {
    use std::cell::Cell;

    let unique = UniqueHandle::new(Cell::new(1));
    let moved = thread::spawn(move || {
        unique.set(2);
        unique.into_inner().get()
    });
    assert_eq!(moved.join().unwrap(), 2);
}
