use sovran_registry::Container;
use std::sync::Arc;
use std::thread;

#[allow(dead_code)]
struct Slot<const N: usize>;

#[derive(Clone, Debug, PartialEq)]
struct Shared(usize);

const ROUNDS: usize = 500;

fn worker<const N: usize>(c: &Container) {
    for i in 0..ROUNDS {
        c.add_as::<usize, Slot<N>>(i);
        // no other thread touches this key, so the write must be visible
        assert_eq!(c.get_as::<usize, Slot<N>>(), i);

        if i % 3 == 0 {
            assert!(c.remove::<Slot<N>>());
            assert_eq!(c.try_get_as::<usize, Slot<N>>(), None);
        }

        // contended key; whatever is there must be a whole value
        c.add(Shared(N));
        if let Some(Shared(owner)) = c.try_get::<Shared>() {
            assert!(owner < 8);
        }
    }
    c.add_as::<usize, Slot<N>>(N * 1000);
}

#[test]
fn test_concurrent_add_remove_get() {
    let c = Container::new();

    thread::scope(|s| {
        s.spawn(|| worker::<0>(&c));
        s.spawn(|| worker::<1>(&c));
        s.spawn(|| worker::<2>(&c));
        s.spawn(|| worker::<3>(&c));
        s.spawn(|| worker::<4>(&c));
        s.spawn(|| worker::<5>(&c));
        s.spawn(|| worker::<6>(&c));
        s.spawn(|| worker::<7>(&c));
    });

    // eight slots plus the contended one
    assert_eq!(c.len(), 9);
    assert_eq!(c.get_as::<usize, Slot<0>>(), 0);
    assert_eq!(c.get_as::<usize, Slot<3>>(), 3000);
    assert_eq!(c.get_as::<usize, Slot<7>>(), 7000);
    assert!(c.get::<Shared>().0 < 8);
}

#[test]
fn test_writes_are_visible_to_later_threads() {
    let c = Container::new();

    let writer = {
        let c = c.clone();
        thread::spawn(move || {
            c.add(Arc::new(String::from("from writer")));
            c.add_as::<u64, Shared>(42);
        })
    };
    writer.join().unwrap();

    let reader = {
        let c = c.clone();
        thread::spawn(move || {
            (
                c.get::<Arc<String>>(),
                c.try_get_as::<u64, Shared>(),
            )
        })
    };
    let (text, number) = reader.join().unwrap();
    assert_eq!(text.as_str(), "from writer");
    assert_eq!(number, Some(42));
}

#[test]
fn test_shared_through_arc() {
    let c = Arc::new(Container::new());
    let handles: Vec<_> = (0..4u32)
        .map(|i| {
            let c = Arc::clone(&c);
            thread::spawn(move || {
                c.add(i);
                c.len()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }
    assert!(c.get::<u32>() < 4);
}
