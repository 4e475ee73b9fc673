use bastion_core::{Health, PoisonConfig};
use bastion_system_status_effects::StatusEffects;

const DT: f32 = 0.25;

fn tower_poison() -> PoisonConfig {
    PoisonConfig {
        damage: 5.0,
        duration: 3.0,
        tick_rate: 0.5,
        max_stacks: 3,
    }
}

fn step(effects: &mut StatusEffects, health: &mut Health, ticks: usize) {
    for _ in 0..ticks {
        let report = effects.tick(DT, |amount| health.damage(amount));
        assert!(!report.killed);
    }
}

#[test]
fn three_applications_tick_and_expire_independently() {
    let mut effects = StatusEffects::new();
    let mut health = Health::new(1_000.0);

    effects.apply_poison(&tower_poison());
    step(&mut effects, &mut health, 2);
    assert_eq!(health.current(), 995.0);

    effects.apply_poison(&tower_poison());
    step(&mut effects, &mut health, 2);
    assert_eq!(health.current(), 985.0);

    effects.apply_poison(&tower_poison());
    assert_eq!(effects.poison_stacks().len(), 3);

    let remaining: Vec<f32> = effects
        .poison_stacks()
        .iter()
        .map(|stack| stack.remaining())
        .collect();
    assert_eq!(remaining, vec![2.0, 2.5, 3.0]);

    // t = 3.0: the first stack delivers its sixth tick and expires.
    step(&mut effects, &mut health, 8);
    assert_eq!(effects.poison_stacks().len(), 2);

    // t = 3.5 and t = 4.0: the remaining stacks follow on their own schedules.
    step(&mut effects, &mut health, 2);
    assert_eq!(effects.poison_stacks().len(), 1);
    step(&mut effects, &mut health, 2);
    assert!(effects.poison_stacks().is_empty());

    assert_eq!(health.current(), 1_000.0 - 3.0 * 6.0 * 5.0);
}

#[test]
fn fourth_application_refreshes_instead_of_stacking() {
    let mut effects = StatusEffects::new();
    for _ in 0..3 {
        effects.apply_poison(&tower_poison());
    }
    let mut health = Health::new(1_000.0);
    step(&mut effects, &mut health, 4);

    effects.apply_poison(&tower_poison());
    let stacks = effects.poison_stacks();
    assert_eq!(stacks.len(), 3);
    assert_eq!(stacks[0].remaining(), 3.0);
    assert_eq!(stacks[1].remaining(), 2.0);
}
