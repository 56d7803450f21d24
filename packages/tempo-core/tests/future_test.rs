use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tempo_core::{Error, Future, ManualClock, Outcome};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

fn counter() -> Rc<Cell<usize>> {
    Rc::new(Cell::new(0))
}

#[test]
fn test_new_futures_start_pending_for_every_shape() {
    let f1 = Future::<i32, i32>::new(|_| Outcome::Pending);
    let f2 = Future::<(), i32>::from_fn(|| Outcome::Pending);
    let f3 = Future::<i32, ()>::new(|_| Outcome::Pending);
    let f4 = Future::<(), ()>::from_fn(|| Outcome::Pending);

    assert!(f1.result().is_pending());
    assert!(f2.result().is_pending());
    assert!(f3.result().is_pending());
    assert!(f4.result().is_pending());
}

#[test]
fn test_poll_caches_the_resolved_value() {
    let mut f1 = Future::<i32, i32>::new(Outcome::Resolved);
    let mut f2 = Future::<(), i32>::from_fn(|| Outcome::Resolved(1));
    let mut f3 = Future::<i32, ()>::new(|_| Outcome::Resolved(()));
    let mut f4 = Future::<(), ()>::from_fn(|| Outcome::Resolved(()));

    assert!(f1.poll(1).is_resolved());
    assert!(f2.poll(()).is_resolved());
    assert!(f3.poll(1).is_resolved());
    assert!(f4.poll(()).is_resolved());

    assert_eq!(f1.result().value(), Some(&1));
    assert_eq!(f2.result().value(), Some(&1));
    assert!(f3.is_settled());
    assert!(f4.is_settled());
}

#[test]
fn test_settled_future_never_reinvokes_its_poll_fn() {
    init_tracing();
    let calls = counter();
    let mut future = Future::<i32, i32>::new({
        let calls = calls.clone();
        move |x| {
            calls.set(calls.get() + 1);
            Outcome::Resolved(x * 10)
        }
    });

    assert_eq!(future.poll(1), &Outcome::Resolved(10));
    assert_eq!(future.poll(2), &Outcome::Resolved(10));
    assert_eq!(future.poll(-7), &Outcome::Resolved(10));
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_rejection_is_cached_too() {
    let calls = counter();
    let mut future = Future::<(), i32>::from_fn({
        let calls = calls.clone();
        move || {
            calls.set(calls.get() + 1);
            Outcome::Rejected(Error::from("broken"))
        }
    });

    future.poll(());
    future.poll(());

    assert_eq!(future.result().error(), Some(&Error::from("broken")));
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_pending_future_is_polled_until_it_settles() {
    let clock = ManualClock::new();
    let mut future = Future::<(), u64>::from_fn({
        let clock = clock.clone();
        move || {
            use tempo_core::Clock;
            if clock.now_ms() >= 30 {
                Outcome::Resolved(clock.now_ms())
            } else {
                Outcome::Pending
            }
        }
    });

    for _ in 0..3 {
        assert!(future.poll(()).is_pending());
        clock.advance(10);
    }

    assert_eq!(future.poll(()), &Outcome::Resolved(30));
}

#[test]
fn test_static_constructors_are_already_settled() {
    let mut resolved = Future::<i32, &str>::resolve("ok");
    let mut rejected = Future::<i32, &str>::reject(Error::from("no"));

    assert!(resolved.is_settled());
    assert_eq!(resolved.poll(5), &Outcome::Resolved("ok"));
    assert_eq!(rejected.poll(5).error(), Some(&Error::from("no")));
}

#[test]
fn test_chain_is_pending_while_the_first_future_is_pending() {
    let mut c1 = Future::<i32, i32>::new(|_| Outcome::Pending)
        .and_then(Future::<i32, ()>::new(|_| Outcome::Resolved(())));
    let mut c2 = Future::<(), i32>::from_fn(|| Outcome::Pending)
        .and_then(Future::<i32, ()>::new(|_| Outcome::Resolved(())));
    let mut c3 = Future::<i32, ()>::new(|_| Outcome::Pending)
        .and_then(Future::<(), ()>::from_fn(|| Outcome::Resolved(())));
    let mut c4 = Future::<(), ()>::from_fn(|| Outcome::Pending)
        .and_then(Future::<(), ()>::from_fn(|| Outcome::Resolved(())));

    assert!(c1.poll(2).is_pending());
    assert!(c2.poll(()).is_pending());
    assert!(c3.poll(2).is_pending());
    assert!(c4.poll(()).is_pending());
}

#[test]
fn test_chain_resolves_with_the_last_value() {
    let mut c1 = Future::<i32, i32>::new(Outcome::Resolved)
        .and_then(Future::new(|x: i32| Outcome::<i32>::Resolved(x * 2)));
    let mut c2 = Future::<(), i32>::resolve(3)
        .and_then(Future::new(|x: i32| Outcome::<i32>::Resolved(x + 3)));
    let mut c3 = Future::<i32, ()>::new(|_| Outcome::Resolved(()))
        .and_then(Future::from_fn(|| Outcome::<i32>::Resolved(6)));
    let mut c4 = Future::<(), ()>::resolve(())
        .and_then(Future::from_fn(|| Outcome::<i32>::Resolved(6)));

    assert_eq!(c1.poll(3), &Outcome::Resolved(6));
    assert_eq!(c2.poll(()), &Outcome::Resolved(6));
    assert_eq!(c3.poll(3), &Outcome::Resolved(6));
    assert_eq!(c4.poll(()), &Outcome::Resolved(6));
}

#[test]
fn test_rejection_short_circuits_downstream() {
    let calls = counter();
    let mut chain = Future::<(), i32>::reject(Error::from("boom"))
        .map({
            let calls = calls.clone();
            move |x| {
                calls.set(calls.get() + 1);
                x + 1
            }
        })
        .and_then(Future::new({
            let calls = calls.clone();
            move |x: i32| {
                calls.set(calls.get() + 1);
                Outcome::<i32>::Resolved(x)
            }
        }));

    assert_eq!(chain.poll(()).error(), Some(&Error::from("boom")));
    assert_eq!(calls.get(), 0);
}

#[derive(Debug, Clone, PartialEq)]
enum LinkError {
    Generic(String),
    Unreachable,
}

impl From<Error> for LinkError {
    fn from(error: Error) -> Self {
        LinkError::Generic(error.to_string())
    }
}

#[test]
fn test_rejection_converts_into_the_downstream_error_type() {
    let mut chain = Future::<(), u8>::reject(Error::from("dns failure"))
        .and_then(Future::<u8, u8, LinkError>::new(|_| {
            Outcome::Rejected(LinkError::Unreachable)
        }));

    assert_eq!(
        chain.poll(()).error(),
        Some(&LinkError::Generic("dns failure".into()))
    );
}

#[test]
fn test_stages_run_left_to_right_exactly_once() {
    init_tracing();
    let clock = ManualClock::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    let mut chain = Future::<i32, i32>::new({
        let clock = clock.clone();
        let log = log.clone();
        move |x| {
            use tempo_core::Clock;
            if clock.now_ms() < 50 {
                return Outcome::Pending;
            }
            log.borrow_mut().push("first");
            Outcome::Resolved(x * 3)
        }
    })
    .map({
        let log = log.clone();
        move |x| {
            log.borrow_mut().push("second");
            x > 5
        }
    })
    .and_then(Future::new({
        let log = log.clone();
        let mut polls = 0;
        move |big: bool| {
            polls += 1;
            if polls < 3 {
                return Outcome::Pending;
            }
            log.borrow_mut().push("third");
            Outcome::<&str>::Resolved(if big { "big" } else { "small" })
        }
    }));

    let mut rounds = 0;
    while chain.poll(2).is_pending() {
        clock.advance(10);
        rounds += 1;
        assert!(rounds < 100);
    }

    assert_eq!(chain.result(), &Outcome::Resolved("big"));
    assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn test_map_value_to_value() {
    let mut chain = Future::<(), i32>::resolve(3).map(|x| x * 2).map(|x| x + 1);
    assert_eq!(chain.poll(()), &Outcome::Resolved(7));
}

#[test]
fn test_consume_value_to_nothing() {
    let seen = Rc::new(Cell::new(0));
    let mut chain = Future::<(), i32>::resolve(42).consume({
        let seen = seen.clone();
        move |x| seen.set(x)
    });

    assert_eq!(chain.poll(()), &Outcome::Resolved(()));
    assert_eq!(seen.get(), 42);
}

#[test]
fn test_produce_nothing_to_value() {
    let mut chain = Future::<u8, ()>::new(|_| Outcome::Resolved(())).produce(|| "ready");
    assert_eq!(chain.poll(0), &Outcome::Resolved("ready"));
}

#[test]
fn test_then_run_nothing_to_nothing() {
    let calls = counter();
    let mut chain = Future::<(), ()>::resolve(()).then_run({
        let calls = calls.clone();
        move || calls.set(calls.get() + 1)
    });

    chain.poll(());
    chain.poll(());

    assert!(chain.result().is_resolved());
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_clones_share_settled_state() {
    let calls = counter();
    let mut source = Future::<(), i32>::from_fn({
        let calls = calls.clone();
        move || {
            calls.set(calls.get() + 1);
            Outcome::Resolved(5)
        }
    });
    source.poll(());

    let mut doubled = source.clone().map(|x| x * 2);
    let mut negated = source.clone().map(|x| -x);

    assert_eq!(doubled.poll(()), &Outcome::Resolved(10));
    assert_eq!(negated.poll(()), &Outcome::Resolved(-5));
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_clones_of_a_pending_future_poll_independently() {
    let mut first = Future::<(), u32>::from_fn({
        let mut polls = 0;
        move || {
            polls += 1;
            if polls == 2 {
                Outcome::Resolved(polls)
            } else {
                Outcome::Pending
            }
        }
    });
    first.poll(());

    let mut copy = first.clone();

    assert_eq!(copy.poll(()), &Outcome::Resolved(2));
    assert_eq!(first.poll(()), &Outcome::Resolved(2));
}
