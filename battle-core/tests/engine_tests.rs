use battle_core::engine::Payout;
use battle_core::prelude::*;
use battle_core::sinks::SettlementRecorder;
use rand::rngs::SmallRng;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn d(value: i64) -> Decimal {
    Decimal::from(value)
}

fn player(name: &str, user_id: u64, hp: i64, damage: i64, armor: i64) -> Combatant {
    Combatant::player(name, user_id, d(hp), d(damage), d(armor))
}

fn striker(mut combatant: Combatant) -> Combatant {
    combatant.perfect_accuracy = true;
    combatant.initiative = 10;
    combatant
}

fn flat_options(seed: u64) -> BattleOptions {
    BattleOptions {
        damage_variance: 0,
        pet_damage_variance: 0,
        ..BattleOptions::with_seed(seed)
    }
}

fn quiet_config() -> BattleConfig {
    BattleConfig {
        class_buffs: false,
        cheat_death: false,
        tripping: false,
        status_effects: false,
        ..BattleConfig::default()
    }
}

fn brawl_trajectory(seed: u64) -> (Vec<(Decimal, Decimal)>, Option<usize>) {
    let a = player("A", 1, 300, 30, 5).with_luck(d(75));
    let b = player("B", 2, 300, 20, 10);
    let mut battle = BrawlBattle::between(
        a,
        b,
        BattleConfig::default(),
        BattleOptions::with_seed(seed),
        Collaborators::default(),
    )
    .expect("valid brawl");
    assert!(battle.start_battle());
    let mut trajectory = Vec::new();
    while battle.process_turn() {
        let teams = battle.core().teams();
        trajectory.push((teams[0].members[0].hp, teams[1].members[0].hp));
        assert!(trajectory.len() < 10_000, "brawl never ended");
    }
    let outcome = battle.end_battle();
    if let Some(winner) = outcome.winner() {
        assert!(battle.core().teams()[winner].members[0].is_alive());
    }
    (trajectory, outcome.winner())
}

#[test]
fn seeded_brawl_is_deterministic() {
    let (first, first_winner) = brawl_trajectory(42);
    let (second, second_winner) = brawl_trajectory(42);
    assert_eq!(first, second);
    assert_eq!(first_winner, second_winner);
    assert!(first_winner.is_some());
}

#[test]
fn timed_out_brawl_goes_to_the_healthier_side() {
    let clock = Arc::new(ManualClock::new());
    let mut battle = BrawlBattle::between(
        player("A", 1, 1000, 30, 5),
        player("B", 2, 1000, 20, 10),
        BattleConfig::default(),
        BattleOptions::with_seed(3),
        Collaborators::default().with_clock(clock.clone()),
    )
    .expect("valid brawl");
    battle.start_battle();
    battle
        .core_mut()
        .combatant_mut(CombatantRef::new(1, 0))
        .expect("slot exists")
        .take_damage(d(500));
    assert!(!battle.is_battle_over());

    clock.advance(Duration::from_secs(301));
    assert!(battle.is_timed_out());
    assert!(battle.is_battle_over());
    assert!(!battle.process_turn());

    let outcome = battle.end_battle();
    assert!(outcome.timed_out);
    assert_eq!(outcome.winner(), Some(0));
}

#[test]
fn hp_floor_predicate_and_turn_counter_hold_through_battles() {
    for seed in 0..25 {
        let teams = vec![
            Team::new(
                "Red",
                vec![
                    player("R1", 1, 120, 40, 10),
                    Combatant::pet("Hound", d(60), d(25), d(5)),
                ],
            ),
            Team::new("Blue", vec![player("B1", 2, 150, 35, 15), player("B2", 3, 90, 50, 0)]),
            Team::new("Green", vec![Combatant::monster("Troll", d(200), d(30), d(20))]),
        ];
        let mut battle = TeamBattle::new(
            teams,
            BattleConfig::default(),
            BattleOptions::with_seed(seed),
            Collaborators::default(),
        )
        .expect("valid teams");
        battle.start_battle();
        let mut last_turn = battle.core().current_turn();
        let mut guard = 0;
        loop {
            let over = battle.is_battle_over();
            assert_eq!(over, battle.is_battle_over());
            if over || !battle.process_turn() {
                break;
            }
            let turn = battle.core().current_turn();
            assert!(turn > last_turn);
            last_turn = turn;
            for member in battle.core().teams().iter().flat_map(|t| t.members.iter()) {
                assert!(member.hp >= Decimal::ZERO);
                assert!(member.hp <= member.max_hp.max(d(75)));
            }
            guard += 1;
            assert!(guard < 10_000);
        }
        let outcome = battle.end_battle();
        assert!(battle.core().is_finished());
        assert_eq!(battle.end_battle(), outcome);
    }
}

#[test]
fn cheat_death_revives_at_75_exactly_once() {
    let mut hero = player("Hero", 1, 100, 5, 0);
    hero.death_cheat_chance = d(100);
    let ogre = striker(Combatant::monster("Ogre", d(1000), d(500), d(0)));
    let mut battle = PveBattle::new(
        Team::new("Heroes", vec![hero]),
        Team::new("Ogres", vec![ogre]),
        PveContext {
            monster_tier: 2,
            macro_counter: 0,
        },
        BattleConfig::default(),
        BattleOptions::with_seed(7),
        Collaborators::default(),
    )
    .expect("valid pve");
    battle.start_battle();

    assert!(battle.process_turn());
    let hero = &battle.core().teams()[0].members[0];
    assert_eq!(hero.hp, d(75));
    assert!(hero.has_cheated_death);
    assert!(!battle.core().is_team_defeated(0));
    assert!(!battle.is_battle_over());

    // Hero's turn, then the ogre swings again.
    assert!(battle.process_turn());
    assert!(battle.process_turn());
    assert_eq!(battle.core().teams()[0].members[0].hp, Decimal::ZERO);
    assert!(battle.is_battle_over());
    assert_eq!(battle.end_battle().winner(), Some(1));
}

#[test]
fn reflection_returns_exactly_blocked_times_fraction() {
    let mut wall = player("Wall", 2, 1000, 10, 40);
    wall.damage_reflection = Decimal::new(5, 1);
    let mut battle = BrawlBattle::between(
        striker(player("Striker", 1, 100, 50, 0)),
        wall,
        BattleConfig::default(),
        flat_options(1),
        Collaborators::default(),
    )
    .expect("valid brawl");
    battle.start_battle();
    assert!(battle.process_turn());
    let teams = battle.core().teams();
    // 50 raw, 40 blocked, half of it comes back.
    assert_eq!(teams[0].members[0].hp, d(80));
    assert_eq!(teams[1].members[0].hp, d(990));
}

#[test]
fn reflection_can_kill_the_attacker_and_is_logged() {
    let recorder = Arc::new(ReplayRecorder::new());
    let mut wall = player("Wall", 2, 1000, 10, 40);
    wall.damage_reflection = Decimal::new(5, 1);
    let mut battle = BrawlBattle::between(
        striker(player("Striker", 1, 20, 50, 0)),
        wall,
        BattleConfig::default(),
        flat_options(1),
        Collaborators::default().with_replay(recorder.clone()),
    )
    .expect("valid brawl");
    battle.start_battle();
    assert!(battle.process_turn());
    assert_eq!(battle.core().teams()[0].members[0].hp, Decimal::ZERO);
    let lines = recorder.log_lines(battle.battle_id());
    assert!(lines.iter().any(|l| l == "Striker was slain by reflected damage!"));
    assert!(battle.is_battle_over());
    assert_eq!(battle.end_battle().winner(), Some(1));
}

#[test]
fn fire_pet_hits_nature_harder_before_armor() {
    let pet = striker(Combatant::pet("Ember", d(200), d(100), d(0)).with_element(Element::Fire));
    let target = player("Sprout", 2, 1000, 10, 20).with_element(Element::Nature);
    let config = BattleConfig {
        pets_continue_battle: true,
        ..quiet_config()
    };
    let mut battle =
        BrawlBattle::between(pet, target, config, flat_options(5), Collaborators::default())
            .expect("valid brawl");
    battle.start_battle();
    assert!(battle.process_turn());
    // 100 * 1.2 = 120, minus 20 armor.
    assert_eq!(battle.core().teams()[1].members[0].hp, d(900));
}

#[test]
fn team_battles_focus_the_weakest_enemy() {
    let trials = 1000;
    let weak_slot = 3;
    let mut focused = 0;
    for seed in 0..trials {
        let hunter = striker(Combatant::monster("Hunter", d(500), d(10), d(0)));
        let prey: Vec<Combatant> = (0..10)
            .map(|i| {
                let mut c = Combatant::monster(format!("Prey {i}"), d(1000), d(10), d(0));
                if i == weak_slot {
                    c.take_damage(d(900));
                }
                c
            })
            .collect();
        let mut battle = TeamBattle::new(
            vec![Team::new("Hunters", vec![hunter]), Team::new("Herd", prey)],
            quiet_config(),
            flat_options(seed),
            Collaborators::default(),
        )
        .expect("valid teams");
        battle.start_battle();
        assert!(battle.process_turn());
        if battle.core().teams()[1].members[weak_slot].hp == d(90) {
            focused += 1;
        }
    }
    // Focus 75% of the time, plus a tenth of the uniform quarter.
    let ratio = focused as f64 / trials as f64;
    assert!((ratio - 0.775).abs() < 0.05, "focus ratio {ratio}");
}

#[test]
fn focus_compares_hp_percentage_across_different_max_hp() {
    let trials = 1000;
    let mut on_tank = 0;
    for seed in 0..trials {
        let hunter = striker(Combatant::monster("Hunter", d(500), d(10), d(0)));
        let mut tank = Combatant::monster("Tank", d(1000), d(10), d(0));
        tank.take_damage(d(900));
        let mut scout = Combatant::monster("Scout", d(100), d(10), d(0));
        scout.take_damage(d(5));
        let mut battle = TeamBattle::new(
            vec![Team::new("Hunters", vec![hunter]), Team::new("Herd", vec![scout, tank])],
            quiet_config(),
            flat_options(seed),
            Collaborators::default(),
        )
        .expect("valid teams");
        battle.start_battle();
        assert!(battle.process_turn());
        if battle.core().teams()[1].members[1].hp == d(90) {
            on_tank += 1;
        }
    }
    // The tank sits at 10% against the scout's 95%, so focus lands on it.
    let ratio = on_tank as f64 / trials as f64;
    assert!((ratio - 0.875).abs() < 0.05, "tank ratio {ratio}");
}

#[test]
fn exact_hp_ties_break_without_bias() {
    let trials = 2000;
    let mut first_wins = 0;
    for seed in 0..trials {
        let clock = Arc::new(ManualClock::new());
        let teams = vec![
            Team::new("Left", vec![player("L", 1, 100, 10, 0)]),
            Team::new("Right", vec![player("R", 2, 100, 10, 0)]),
        ];
        let mut battle = TeamBattle::new(
            teams,
            BattleConfig::default(),
            BattleOptions::with_seed(seed),
            Collaborators::default().with_clock(clock.clone()),
        )
        .expect("valid teams");
        battle.start_battle();
        clock.advance(Duration::from_secs(600));
        let outcome = battle.end_battle();
        assert!(outcome.timed_out);
        if outcome.winner() == Some(0) {
            first_wins += 1;
        }
    }
    let ratio = first_wins as f64 / trials as f64;
    assert!((ratio - 0.5).abs() < 0.05, "first team won {ratio}");
}

struct Necromancy {
    summoned: AtomicBool,
}

impl PetSkillHooks for Necromancy {
    fn on_turn(&self, pet: &mut Combatant, _rng: &mut SmallRng) -> Vec<String> {
        if pet.name == "Lich" && !self.summoned.swap(true, Ordering::SeqCst) {
            pet.pending_summon = Some(SummonDirective {
                name: "Skeleton Warrior".to_string(),
                hp: d(40),
                damage: d(12),
                armor: d(3),
                element: Element::Dark,
                luck: d(20),
            });
            return vec!["Lich raises the dead...".to_string()];
        }
        Vec::new()
    }
}

#[test]
fn summons_join_the_team_and_turn_order() {
    let recorder = Arc::new(ReplayRecorder::new());
    let hooks = Arc::new(Necromancy {
        summoned: AtomicBool::new(false),
    });
    let mut battle = PvpBattle::new(
        Team::new(
            "Dark",
            vec![
                player("Mage", 1, 300, 20, 5),
                Combatant::pet("Lich", d(500), d(15), d(0)),
            ],
        ),
        Team::new("Light", vec![player("Paladin", 2, 300, 20, 5)]),
        quiet_config(),
        BattleOptions::with_seed(9),
        Collaborators::default()
            .with_pet_skills(hooks)
            .with_replay(recorder.clone()),
    )
    .expect("valid pvp");
    battle.start_battle();
    assert_eq!(battle.core().turn_order().len(), 3);
    assert!(battle.process_turn());
    let dark = &battle.core().teams()[0];
    assert_eq!(dark.len(), 3);
    assert!(dark.members[2].is_summoned());
    assert_eq!(battle.core().turn_order().len(), 4);
    let lines = recorder.log_lines(battle.battle_id());
    assert!(lines.iter().any(|l| l == "Lich summons Skeleton Warrior!"));
}

#[test]
fn inflicted_effects_apply_and_unknown_ones_are_skipped() {
    let mut venomous = striker(player("Viper", 1, 300, 20, 0));
    venomous.inflicts = vec![
        EffectRequest::new("petrify", Decimal::ONE, 2, d(5)),
        EffectRequest::new("poison", Decimal::ONE, 3, d(6)),
    ];
    let config = BattleConfig {
        luck_effects: false,
        status_effects: true,
        ..quiet_config()
    };
    let mut battle = BrawlBattle::between(
        venomous,
        player("Victim", 2, 300, 20, 0),
        config,
        flat_options(2),
        Collaborators::default(),
    )
    .expect("valid brawl");
    battle.start_battle();
    assert!(battle.process_turn());
    let victim = &battle.core().teams()[1].members[0];
    assert_eq!(victim.status_effects.len(), 1);
    assert_eq!(victim.get_status_effects_display(), "Poison(3)");
    assert!(battle.process_turn());
}

#[test]
fn pve_win_settles_with_macro_penalty() {
    let settlement = Arc::new(SettlementRecorder::new());
    let mut battle = PveBattle::new(
        Team::new("Heroes", vec![striker(player("Hero", 1, 500, 10_000, 0))]),
        Team::new("Goblins", vec![Combatant::monster("Goblin", d(50), d(5), d(0))]),
        PveContext {
            monster_tier: 3,
            macro_counter: 15,
        },
        quiet_config(),
        BattleOptions::with_seed(4),
        Collaborators::default().with_settlement(settlement.clone()),
    )
    .expect("valid pve");
    let outcome = run_to_completion(&mut battle, 100);
    assert_eq!(outcome.winner(), Some(0));
    battle.end_battle();
    let requests = settlement.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].plan,
        RewardPlan::Pve {
            monster_tier: 3,
            reward_multiplier: Decimal::new(75, 2),
        }
    );
    assert_eq!(requests[0].participants, vec![1]);
}

#[test]
fn pve_timeout_is_a_draw_without_rewards() {
    let clock = Arc::new(ManualClock::new());
    let settlement = Arc::new(SettlementRecorder::new());
    let mut battle = PveBattle::new(
        Team::new("Heroes", vec![player("Hero", 1, 500, 10, 0)]),
        Team::new("Golems", vec![Combatant::monster("Golem", d(500), d(10), d(0))]),
        PveContext::default(),
        BattleConfig::default(),
        BattleOptions::with_seed(4),
        Collaborators::default()
            .with_clock(clock.clone())
            .with_settlement(settlement.clone()),
    )
    .expect("valid pve");
    battle.start_battle();
    assert!(battle.process_turn());
    clock.advance(Duration::from_secs(301));
    let outcome = battle.end_battle();
    assert!(outcome.is_draw());
    assert!(outcome.timed_out);
    assert_eq!(settlement.requests()[0].plan, RewardPlan::None);
}

#[test]
fn wagered_pvp_pays_the_winner_once() {
    let settlement = Arc::new(SettlementRecorder::new());
    let mut battle = PvpBattle::new(
        Team::new("Champion", vec![striker(player("Champion", 1, 500, 10_000, 0))]),
        Team::new("Rookie", vec![player("Rookie", 2, 100, 5, 0)]),
        quiet_config(),
        BattleOptions::with_seed(8),
        Collaborators::default()
            .with_settlement(settlement.clone())
            .with_ledger(Arc::new(RecordedLedger::new([1, 2]))),
    )
    .expect("valid pvp")
    .with_entry_fee(d(100));
    let outcome = run_to_completion(&mut battle, 100);
    assert_eq!(outcome.winner(), Some(0));
    battle.end_battle();
    let requests = settlement.requests();
    assert_eq!(requests.len(), 1);
    match &requests[0].plan {
        RewardPlan::Wager { payouts, verified, .. } => {
            assert_eq!(verified, &vec![2]);
            assert_eq!(
                payouts,
                &vec![Payout {
                    user_id: 1,
                    amount: d(100)
                }]
            );
        }
        other => panic!("unexpected plan {other:?}"),
    }
}

#[test]
fn simple_mode_decides_by_a_single_roll() {
    let config = BattleConfig {
        simple: true,
        ..BattleConfig::default()
    };
    let mut battle = PvpBattle::new(
        Team::new("Strong", vec![player("Strong", 1, 100, 100, 100)]),
        Team::new("Weak", vec![player("Weak", 2, 100, 1, 1)]),
        config,
        BattleOptions::with_seed(12),
        Collaborators::default(),
    )
    .expect("valid pvp");
    assert!(battle.start_battle());
    assert!(!battle.start_battle());
    assert!(battle.is_battle_over());
    assert!(!battle.process_turn());
    let outcome = battle.end_battle();
    assert_eq!(outcome.winner(), Some(0));
    assert_eq!(battle.core().teams()[1].members[0].hp, d(100));
}

struct BrokenSink;

impl BattleRenderer for BrokenSink {
    fn render(&self, _snapshot: &battle_core::snapshot::BattleSnapshot) -> Result<(), SinkError> {
        Err(SinkError::Render("display gone".to_string()))
    }
}

impl battle_core::sinks::ReplaySink for BrokenSink {
    fn append(
        &self,
        _battle_id: BattleId,
        _entry: &battle_core::log::LogEntry,
    ) -> Result<(), SinkError> {
        Err(SinkError::Replay("disk full".to_string()))
    }
}

impl RewardSettlement for BrokenSink {
    fn settle(&self, _request: &SettlementRequest) -> Result<(), SinkError> {
        Err(SinkError::Settlement("bank closed".to_string()))
    }
}

#[test]
fn failing_sinks_never_interrupt_a_battle() {
    let sink = Arc::new(BrokenSink);
    let mut battle = BrawlBattle::between(
        striker(player("A", 1, 100, 1000, 0)),
        player("B", 2, 100, 10, 0),
        BattleConfig::default(),
        BattleOptions::with_seed(1),
        Collaborators::default()
            .with_renderer(sink.clone())
            .with_replay(sink.clone())
            .with_settlement(sink),
    )
    .expect("valid brawl");
    let outcome = run_to_completion(&mut battle, 50);
    assert_eq!(outcome.winner(), Some(0));
    assert!(!battle.core().log().is_empty());
}

#[test]
fn participants_skip_pets_and_duplicates() {
    let battle = TeamBattle::new(
        vec![
            Team::new(
                "A",
                vec![player("P1", 1, 100, 10, 0), Combatant::pet("Cat", d(30), d(5), d(0))],
            ),
            Team::new(
                "B",
                vec![player("P2", 2, 100, 10, 0), player("P1 again", 1, 100, 10, 0)],
            ),
        ],
        BattleConfig::default(),
        BattleOptions::default(),
        Collaborators::default(),
    )
    .expect("valid teams");
    assert_eq!(battle.get_participants(), vec![1, 2]);
}

#[test]
fn snapshots_serialize_to_plain_json() {
    let recorder = Arc::new(ReplayRecorder::with_snapshots());
    let mut battle = BrawlBattle::between(
        player("A", 1, 100, 30, 5),
        player("B", 2, 100, 20, 10),
        BattleConfig::default(),
        BattleOptions::with_seed(6),
        Collaborators::default().with_replay(recorder.clone()),
    )
    .expect("valid brawl");
    run_to_completion(&mut battle, 200);
    let data = battle.serialize_battle_data();
    assert_eq!(data["variant"], "brawl");
    assert_eq!(data["phase"], "finished");
    assert!(data["teams"][0]["members"][0]["hp"].is_f64());
    let log = battle.serialize_battle_log();
    assert!(log["entries"].as_array().map_or(false, |e| !e.is_empty()));
    let replay = recorder.to_json(battle.battle_id());
    assert_eq!(
        replay["log"].as_array().map(Vec::len),
        replay["turn_states"].as_array().map(Vec::len)
    );
}
