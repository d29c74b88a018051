//! Tests for the narrating services and command dispatch

use std::sync::Arc;

use clap::Parser;
use rstest::rstest;

use patternkit::application::services::{ApprovalService, HierarchyService, Removal};
use patternkit::cli::commands::run;
use patternkit::cli::{Cli, CliError, Commands};
use patternkit::config::{ApproverConfig, ChainConfig, Settings};
use patternkit::domain::{EnemyKind, EntityId, Position, Request};
use patternkit::exitcode;
use patternkit::infrastructure::traits::{RecordingConsole, Tone};
use patternkit::infrastructure::ServiceContainer;
use patternkit::util::testing;

fn container(settings: Settings) -> (ServiceContainer, Arc<RecordingConsole>) {
    testing::init_test_setup();
    let console = Arc::new(RecordingConsole::new());
    let container = ServiceContainer::with_deps(settings, console.clone());
    (container, console)
}

// ============================================================
// Hierarchy
// ============================================================

#[test]
fn given_sample_tree_when_removing_banner_then_report_and_narration_match() {
    // Arrange
    let (container, console) = container(Settings::default());
    let mut root = HierarchyService::sample_tree();

    // Act
    let report = container
        .hierarchy_service()
        .run(&mut root, &["banner.jpg".to_string()], false);

    // Assert
    assert_eq!(report.before, 4148);
    assert_eq!(report.after, 2100);
    assert_eq!(
        report.removals,
        vec![Removal {
            name: "banner.jpg".into(),
            removed: true,
            freed: 2048
        }]
    );

    let lines = console.lines();
    assert_eq!(lines[0], "== Before ==");
    assert_eq!(lines[1], "+ root [4148 B]");
    assert!(lines.contains(&"Total: 4148 bytes".to_string()));
    assert!(lines.contains(&"Removing banner.jpg...".to_string()));
    assert!(lines.contains(&"== After ==".to_string()));
    assert_eq!(lines.last().map(String::as_str), Some("Total: 2100 bytes"));
    assert!(console
        .entries()
        .contains(&(Tone::Success, "Removed.".to_string())));
}

#[test]
fn given_missing_name_when_removing_then_warns_and_frees_nothing() {
    let (container, console) = container(Settings::default());
    let mut root = HierarchyService::sample_tree();

    let report = container
        .hierarchy_service()
        .run(&mut root, &["ghost.txt".to_string()], false);

    assert_eq!(report.before, report.after);
    assert_eq!(report.removals[0].freed, 0);
    assert!(!report.removals[0].removed);
    assert!(console
        .entries()
        .contains(&(Tone::Warning, "Not found.".to_string())));
}

#[test]
fn given_configured_indent_step_when_rendering_then_children_use_it() {
    let mut settings = Settings::default();
    settings.render.indent_step = 4;
    let (container, console) = container(settings);
    let mut root = HierarchyService::sample_tree();

    container.hierarchy_service().run(&mut root, &[], false);

    assert!(console.lines().contains(&"    + docs [1500 B]".to_string()));
}

#[test]
fn given_tree_mode_when_running_then_box_drawing_is_used() {
    let (container, console) = container(Settings::default());
    let mut root = HierarchyService::sample_tree();

    container.hierarchy_service().run(&mut root, &[], true);

    assert!(console.contains("root [4148 B]"));
    assert!(console.contains("└"));
}

// ============================================================
// Approval
// ============================================================

#[test]
fn given_default_chain_when_announcing_then_order_is_printed() {
    let (container, console) = container(Settings::default());

    container.approval_service().unwrap().announce();

    assert_eq!(
        console.lines(),
        vec!["== Approval chain: TeamLead -> Manager -> Director -> CEO =="]
    );
}

#[rstest]
#[case(999.9, "Team lunch", vec!["[APPROVED]  TeamLead approved: Team lunch (RM 999.90)"])]
#[case(4_200.0, "Conference fees", vec![
    "[PASS]      TeamLead passes: Conference fees (RM 4200.00)",
    "[APPROVED]  Manager approved: Conference fees (RM 4200.00)",
])]
#[case(350_000.0, "New office renovation", vec![
    "[PASS]      TeamLead passes: New office renovation (RM 350000.00)",
    "[PASS]      Manager passes: New office renovation (RM 350000.00)",
    "[PASS]      Director passes: New office renovation (RM 350000.00)",
    "[PASS]      CEO cannot approve per policy cap: New office renovation (RM 350000.00)",
    "[REJECTED]  No approver for: New office renovation (RM 350000.00)",
])]
fn given_request_when_submitting_then_every_verdict_is_narrated(
    #[case] amount: f64,
    #[case] description: &str,
    #[case] expected: Vec<&str>,
) {
    let (container, console) = container(Settings::default());
    let service = container.approval_service().unwrap();

    service.submit(&Request::new(amount, description));

    assert_eq!(console.lines(), expected);
}

#[test]
fn given_sample_batch_when_submitting_then_only_the_largest_is_unresolved() {
    let (container, console) = container(Settings::default());
    let service = container.approval_service().unwrap();

    let resolutions = service.submit_all(&ApprovalService::sample_requests());

    let approvers: Vec<Option<&str>> = resolutions.iter().map(|r| r.approved_by()).collect();
    assert_eq!(
        approvers,
        vec![
            Some("TeamLead"),
            Some("TeamLead"),
            Some("Manager"),
            Some("Manager"),
            Some("Director"),
            Some("CEO"),
            None,
        ]
    );
    let failures = console
        .entries()
        .into_iter()
        .filter(|(tone, _)| *tone == Tone::Failure)
        .count();
    assert_eq!(failures, 1);
}

#[test]
fn given_configured_currency_and_approvers_when_submitting_then_they_are_used() {
    let mut settings = Settings::default();
    settings.chain = ChainConfig {
        currency: "EUR".into(),
        approvers: vec![ApproverConfig::new("Clerk", 10.0)],
    };
    let (container, console) = container(settings);

    container
        .approval_service()
        .unwrap()
        .submit(&Request::new(5.0, "Stamps"));

    assert_eq!(
        console.lines(),
        vec!["[APPROVED]  Clerk approved: Stamps (EUR 5.00)"]
    );
}

#[test]
fn given_empty_approver_list_when_building_service_then_config_error() {
    let mut settings = Settings::default();
    settings.chain.approvers.clear();
    let (container, _console) = container(settings);

    assert!(container.approval_service().is_err());
}

// ============================================================
// Spawner
// ============================================================

#[test]
fn given_default_templates_when_running_wave_then_customisations_stay_local() {
    // Arrange
    let (container, console) = container(Settings::default());
    let service = container.spawner_service();
    service.register_defaults();

    // Act
    let report = service.run_wave(3).unwrap();

    // Assert: wave layout
    let ids: Vec<EntityId> = report.wave.iter().map(|e| e.id()).collect();
    assert_eq!(ids, vec![EntityId(1), EntityId(2), EntityId(3), EntityId(4)]);
    assert_eq!(report.wave[1].position(), Position::new(-2, 0));
    assert_eq!(
        report.wave[1].to_string(),
        "Orc  #2 @(-2,0) HP=120 ATK=15 AI(lv=1,Aggressive) Abil=[Roar,Charge,Berserk]"
    );
    assert_eq!(
        report.wave[3].to_string(),
        "Dragon#4 @(10,2) HP=350 ATK=55 Elem=Fire AI(lv=3,Territorial)"
    );

    // Assert: fresh clones come from unchanged templates
    assert_eq!(
        report.fresh[0].to_string(),
        "Orc  #5 @(0,0) HP=120 ATK=15 AI(lv=1,Aggressive) Abil=[Roar,Charge]"
    );
    match report.fresh[1].kind() {
        EnemyKind::Dragon(dragon) => assert_eq!(dragon.atk(), 40),
        EnemyKind::Orc(_) => panic!("expected a dragon"),
    }

    assert!(console.contains("=== Spawned Wave ==="));
    assert!(console.contains("=== Fresh clones from unchanged prototypes ==="));
}

#[test]
fn given_configured_first_id_when_running_wave_then_ids_start_there() {
    let mut settings = Settings::default();
    settings.spawner.first_id = 500;
    let (container, _console) = container(settings);
    let service = container.spawner_service();
    service.register_defaults();

    let report = service.run_wave(1).unwrap();

    assert_eq!(report.wave[0].id(), EntityId(500));
    assert_eq!(report.fresh[1].id(), EntityId(503));
}

#[test]
fn given_no_templates_when_running_wave_then_not_found() {
    let (container, console) = container(Settings::default());
    let service = container.spawner_service();

    assert!(service.run_wave(2).is_err());
    assert!(console.lines().is_empty());
    assert_eq!(container.ids.peek(), EntityId(1));
}

// ============================================================
// Command dispatch
// ============================================================

#[test]
fn given_all_command_when_running_then_three_demos_are_narrated() {
    let (container, console) = container(Settings::default());
    let cli = Cli::parse_from(["patternkit", "all"]);

    run(cli.command.as_ref().unwrap(), &cli, &container).unwrap();

    assert!(console.contains("Total: 2100 bytes"));
    assert!(console.contains("== Approval chain: TeamLead -> Manager -> Director -> CEO =="));
    assert!(console.contains("[REJECTED]  No approver for: New office renovation"));
    assert!(console.contains("=== Spawned Wave ==="));
}

#[test]
fn given_single_chain_request_when_running_then_only_it_is_submitted() {
    let (container, console) = container(Settings::default());
    let cli = Cli::parse_from(["patternkit", "chain", "-a", "42", "-m", "Pens"]);

    run(cli.command.as_ref().unwrap(), &cli, &container).unwrap();

    assert_eq!(
        console.lines(),
        vec![
            "== Approval chain: TeamLead -> Manager -> Director -> CEO ==",
            "[APPROVED]  TeamLead approved: Pens (RM 42.00)",
        ]
    );
}

#[test]
fn given_negative_amount_when_running_chain_then_usage_exit_code() {
    let (container, _console) = container(Settings::default());
    let cli = Cli::parse_from(["patternkit", "chain"]);
    let command = Commands::Chain {
        amount: Some(-1.0),
        description: Some("refund".into()),
    };

    let err = run(&command, &cli, &container).unwrap_err();

    assert!(matches!(err, CliError::InvalidArgs(_)));
    assert_eq!(err.exit_code(), exitcode::USAGE);
}

#[test]
fn given_amount_without_description_when_parsing_then_rejected() {
    assert!(Cli::try_parse_from(["patternkit", "chain", "-a", "10"]).is_err());
}

#[rstest]
#[case("0")]
#[case("65")]
fn given_out_of_range_wave_when_parsing_then_rejected(#[case] wave: &str) {
    assert!(Cli::try_parse_from(["patternkit", "prototype", "-w", wave]).is_err());
}
