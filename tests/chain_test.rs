//! Tests for the responsibility chain

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rstest::{fixture, rstest};

use patternkit::domain::{Approver, ChainLink, Handler, Outcome, Request};

#[fixture]
fn chain() -> ChainLink {
    let mut head = ChainLink::new(Approver::new("TeamLead", 1_000.0).unwrap());
    head.attach(ChainLink::new(Approver::new("Manager", 5_000.0).unwrap()))
        .attach(ChainLink::new(Approver::new("Director", 50_000.0).unwrap()))
        .attach(ChainLink::new(Approver::new("CEO", 200_000.0).unwrap()));
    head
}

/// Handler that counts how often it is consulted and never accepts.
struct Spy {
    calls: Arc<AtomicUsize>,
}

impl Handler for Spy {
    fn title(&self) -> &str {
        "Spy"
    }

    fn process(&self, _request: &Request) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        false
    }
}

#[rstest]
#[case(120.0, Some("TeamLead"))]
#[case(999.9, Some("TeamLead"))]
#[case(1_800.0, Some("Manager"))]
#[case(4_200.0, Some("Manager"))]
#[case(22_000.0, Some("Director"))]
#[case(120_000.0, Some("CEO"))]
#[case(200_000.0, Some("CEO"))]
#[case(350_000.0, None)]
fn given_threshold_chain_when_handling_then_first_capable_approver_accepts(
    chain: ChainLink,
    #[case] amount: f64,
    #[case] expected: Option<&str>,
) {
    let resolution = chain.handle(&Request::new(amount, "request"));
    assert_eq!(resolution.approved_by(), expected);
}

#[rstest]
fn given_request_within_second_limit_when_handling_then_trail_stops_there(chain: ChainLink) {
    let resolution = chain.handle(&Request::new(4_200.0, "Conference fees"));

    let trail: Vec<(&str, bool)> = resolution
        .trail
        .iter()
        .map(|v| (v.handler.as_str(), v.accepted))
        .collect();
    assert_eq!(trail, vec![("TeamLead", false), ("Manager", true)]);
}

#[rstest]
fn given_request_above_every_limit_when_handling_then_unresolved_after_full_trail(
    chain: ChainLink,
) {
    let resolution = chain.handle(&Request::new(350_000.0, "New office renovation"));

    assert_eq!(resolution.outcome, Outcome::Unresolved);
    assert!(!resolution.is_resolved());
    assert_eq!(resolution.trail.len(), 4);
    assert!(resolution.trail.iter().all(|v| !v.accepted));
}

#[test]
fn given_acceptance_when_handling_then_later_handlers_are_not_consulted() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut head = ChainLink::new(Approver::new("TeamLead", 1_000.0).unwrap());
    head.attach(ChainLink::new(Spy {
        calls: Arc::clone(&calls),
    }));

    head.handle(&Request::new(10.0, "small"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    head.handle(&Request::new(10_000.0, "large"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[rstest]
fn given_attach_when_building_then_returns_new_tail(chain: ChainLink) {
    assert_eq!(chain.len(), 4);
    assert_eq!(chain.titles(), vec!["TeamLead", "Manager", "Director", "CEO"]);
    assert_eq!(chain.next().map(|n| n.handler().title()), Some("Manager"));
}

#[test]
fn given_attach_on_linked_head_when_building_then_replaces_remainder() {
    let mut head = ChainLink::new(Approver::new("A", 1.0).unwrap());
    head.attach(ChainLink::new(Approver::new("B", 2.0).unwrap()))
        .attach(ChainLink::new(Approver::new("C", 3.0).unwrap()));

    head.attach(ChainLink::new(Approver::new("D", 4.0).unwrap()));

    assert_eq!(head.titles(), vec!["A", "D"]);
}

#[test]
fn given_handler_list_when_building_from_handlers_then_order_is_kept() {
    let handlers: Vec<Box<dyn Handler>> = vec![
        Box::new(Approver::new("A", 1.0).unwrap()),
        Box::new(Approver::new("B", 2.0).unwrap()),
    ];

    let chain = ChainLink::from_handlers(handlers).unwrap();

    assert_eq!(chain.titles(), vec!["A", "B"]);
    assert!(ChainLink::from_handlers(Vec::<Box<dyn Handler>>::new()).is_none());
}

#[rstest]
fn given_ordered_limits_when_checking_then_monotonic(chain: ChainLink) {
    assert!(chain.is_monotonic());
}

#[test]
fn given_unordered_limits_when_handling_then_still_first_accepting_wins() {
    let mut head = ChainLink::new(Approver::new("Big", 10_000.0).unwrap());
    head.attach(ChainLink::new(Approver::new("Small", 100.0).unwrap()));

    assert!(!head.is_monotonic());
    // The small approver is shadowed: everything it could take, Big takes first
    let resolution = head.handle(&Request::new(50.0, "coffee"));
    assert_eq!(resolution.approved_by(), Some("Big"));
}

#[rstest]
#[case("", 10.0)]
#[case("Lead", -1.0)]
#[case("Lead", f64::INFINITY)]
fn given_bad_approver_input_when_constructing_then_validation_error(
    #[case] title: &str,
    #[case] limit: f64,
) {
    assert!(Approver::new(title, limit).is_err());
}

#[rstest]
fn given_shared_chain_when_traversed_concurrently_then_results_agree(chain: ChainLink) {
    let chain = &chain;
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                scope.spawn(move || {
                    let amount = if i % 2 == 0 { 4_200.0 } else { 350_000.0 };
                    chain.handle(&Request::new(amount, "parallel"))
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let resolution = handle.join().unwrap();
            if i % 2 == 0 {
                assert_eq!(resolution.approved_by(), Some("Manager"));
            } else {
                assert_eq!(resolution.outcome, Outcome::Unresolved);
            }
        }
    });
}
