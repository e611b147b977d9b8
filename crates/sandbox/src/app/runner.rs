use std::time::Duration;

use platformer::app::resolve_spawn;
use platformer::{
    Character, ControllerEvent, FadeEvent, FadeTransition, InputCollector, Simulation,
    StaticWorld, TransitionContext, TriggerSet, Typewriter, Vec2,
};
use serde::Serialize;
use tracing::{debug, info};

use super::scenario::{InputEventSpec, LevelSpec, Scenario};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub(crate) struct RunSummary {
    pub(crate) frames: u64,
    pub(crate) physics_ticks: u64,
    pub(crate) dropped_backlog_ms: u64,
    pub(crate) jumps: u32,
    pub(crate) jump_cuts: u32,
    pub(crate) ceiling_cancels: u32,
    pub(crate) landings: u32,
    pub(crate) dashes: u32,
    pub(crate) dash_vetoes: u32,
    pub(crate) transitions: u32,
    pub(crate) levels_visited: Vec<String>,
    pub(crate) intro_chars: usize,
    pub(crate) final_level: String,
    pub(crate) final_position: Vec2,
    pub(crate) final_velocity: Vec2,
    pub(crate) grounded: bool,
}

struct ActiveLevel {
    name: String,
    world: StaticWorld,
    triggers: TriggerSet,
}

impl ActiveLevel {
    fn load(spec: &LevelSpec) -> Self {
        info!(
            level = %spec.name,
            collider_count = spec.colliders.len(),
            trigger_count = spec.triggers.len(),
            "level_loaded"
        );
        Self {
            name: spec.name.clone(),
            world: StaticWorld::new(spec.colliders.clone()),
            triggers: TriggerSet::new(spec.triggers.clone()),
        }
    }
}

/// Plays a validated scenario frame by frame.
pub(crate) fn run_scenario(scenario: &Scenario, time_scale: f32) -> RunSummary {
    let mut summary = RunSummary {
        intro_chars: play_intro(scenario),
        ..RunSummary::default()
    };

    let Some(start) = scenario.level(&scenario.start_level) else {
        return summary;
    };
    let mut level = ActiveLevel::load(start);
    summary.levels_visited.push(level.name.clone());

    let character = Character::new(&scenario.tuning, start.spawn, scenario.body_collider());
    let mut simulation = Simulation::new(character, &scenario.loop_settings.to_loop_config());
    simulation.stepper_mut().set_time_scale(time_scale);

    let mut collector = InputCollector::new(scenario.axis_sensitivity);
    let mut context = TransitionContext::new();
    let mut fade: Option<FadeTransition> = None;

    let mut events: Vec<InputEventSpec> = scenario.input.clone();
    events.sort_by(|a, b| a.at.total_cmp(&b.at));
    let mut next_event = 0;

    let frame_dt = Duration::from_nanos((f64::from(scenario.frame_dt) * 1e9).round() as u64);
    let total_frames = (scenario.duration / scenario.frame_dt).round() as u64;
    let mut dropped_backlog = Duration::ZERO;

    for frame_index in 0..total_frames {
        let now = frame_index as f32 * scenario.frame_dt;
        while next_event < events.len() && events[next_event].at <= now {
            let event = events[next_event];
            collector.handle_action(event.action, event.down);
            next_event += 1;
        }
        collector.set_analog_axis(scenario.axis_at(now));

        let logic_dt = simulation.stepper().scaled_delta(frame_dt).as_secs_f32();
        let input = collector.snapshot_for_frame(logic_dt);
        let report = simulation.advance_frame(frame_dt, &input, &level.world);
        dropped_backlog += report.dropped_backlog;

        for event in simulation.character().frame_events() {
            tally(&mut summary, event);
        }

        if fade.is_none() {
            if let Some(trigger) = level.triggers.poll(simulation.character().bounds()) {
                fade = Some(trigger.fire(&mut context, scenario.fade_seconds));
                summary.transitions += 1;
            }
        }

        let fade_event = fade.as_mut().and_then(|fade| fade.tick(logic_dt));
        match fade_event {
            Some(FadeEvent::LoadRequested(target)) => {
                if let Some(spec) = scenario.level(&target) {
                    level = ActiveLevel::load(spec);
                    let spawn = resolve_spawn(context.take_spawn(), spec.spawn);
                    simulation.character_mut().teleport(spawn);
                    summary.levels_visited.push(level.name.clone());
                }
            }
            Some(FadeEvent::Completed) | Some(FadeEvent::Canceled) => fade = None,
            None => {}
        }
    }

    let character = simulation.character();
    summary.frames = simulation.frames();
    summary.physics_ticks = simulation.ticks();
    summary.dropped_backlog_ms = dropped_backlog.as_millis() as u64;
    summary.final_level = level.name;
    summary.final_position = character.position();
    summary.final_velocity = character.body().velocity;
    summary.grounded = character.is_grounded();

    info!(
        frames = summary.frames,
        physics_ticks = summary.physics_ticks,
        jumps = summary.jumps,
        dashes = summary.dashes,
        transitions = summary.transitions,
        final_level = %summary.final_level,
        "run_finished"
    );
    summary
}

fn play_intro(scenario: &Scenario) -> usize {
    let Some(intro) = &scenario.intro else {
        return 0;
    };
    let mut writer = Typewriter::new(intro.text.clone(), intro.char_interval);
    while writer.is_typing() {
        if writer.tick(scenario.frame_dt) {
            break;
        }
    }
    info!(text = writer.visible_text(), "intro_shown");
    writer.revealed_chars()
}

fn tally(summary: &mut RunSummary, event: &ControllerEvent) {
    debug!(event = event.name(), "controller_event");
    match event {
        ControllerEvent::Jumped { .. } => summary.jumps += 1,
        ControllerEvent::JumpCut { .. } => summary.jump_cuts += 1,
        ControllerEvent::JumpCeilingCancel => summary.ceiling_cancels += 1,
        ControllerEvent::Landed => summary.landings += 1,
        ControllerEvent::DashStarted { .. } => summary.dashes += 1,
        ControllerEvent::DashVetoed { .. } => summary.dash_vetoes += 1,
        ControllerEvent::JumpSustainEnded
        | ControllerEvent::LeftGround
        | ControllerEvent::DashEnded { .. }
        | ControllerEvent::DashReady => {}
    }
}
