use std::io::Write;
use std::path::Path;
use std::time::Duration;

use cardstack_core::controller::SlotPose;
use cardstack_core::{
    GestureSample, ItemId, MotionKnob, MotionParams, Pose, PoseTable, StackController,
};
use cardstack_runtime::{BeforeAfterSession, Frame, Side, StackConfig, StackSession};
use serde::Serialize;

use crate::cli::{KnobsArgs, PosesArgs, SwipeArgs, TapArgs, VariantArg};
use crate::error::{DemoError, Result};

/// Config from `path`, or the stock config.
pub fn load_config(path: Option<&Path>) -> Result<StackConfig> {
    match path {
        Some(path) => Ok(StackConfig::from_file(path)?),
        None => Ok(StackConfig::default()),
    }
}

fn emit<T: Serialize>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// poses
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct SlotReport<'a> {
    position: usize,
    item: ItemId,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    pose: &'a Pose,
}

#[derive(Debug, Serialize)]
struct PosesReport<'a> {
    variant: PoseTable,
    slots: Vec<SlotReport<'a>>,
}

fn slot_reports<'a>(
    slots: &'a [SlotPose],
    title: impl Fn(ItemId) -> Option<&'a str>,
) -> Vec<SlotReport<'a>> {
    slots
        .iter()
        .map(|slot| SlotReport {
            position: slot.position,
            item: slot.item,
            title: title(slot.item),
            pose: &slot.pose,
        })
        .collect()
}

pub fn run_poses(config: &StackConfig, args: &PosesArgs, out: &mut dyn Write) -> Result<()> {
    let variant = match args.variant {
        Some(VariantArg::Primary) => PoseTable::Primary,
        Some(VariantArg::BeforeAfter) => PoseTable::BeforeAfter,
        None => config.variant,
    };
    match variant {
        PoseTable::Primary => {
            let controller = StackController::primary(&config.items, config.motion)?;
            let slots = controller.poses();
            let report = PosesReport {
                variant,
                slots: slot_reports(&slots, |id| {
                    config
                        .items
                        .iter()
                        .find(|item| item.id == id)
                        .map(|item| item.title.as_str())
                }),
            };
            emit(out, &report)
        }
        PoseTable::BeforeAfter => {
            let session = BeforeAfterSession::new(config.photos.clone(), config.motion)?;
            let slots = session.controller().poses();
            let report = PosesReport {
                variant,
                slots: slot_reports(&slots, |id| session.image_for(id)),
            };
            emit(out, &report)
        }
    }
}

// ---------------------------------------------------------------------------
// swipe
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct SwipeReport {
    outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    power: Option<f64>,
    threshold: f64,
    committed: bool,
    binding_before: Vec<ItemId>,
    binding_after: Vec<ItemId>,
    front_title: Option<String>,
    frames_to_settle: usize,
    settled: bool,
    frames: Vec<Frame>,
}

/// Evenly spaced samples ending at the release sample.
fn drag_samples(offset: f64, velocity: f64, moves: usize) -> Vec<GestureSample> {
    let steps = moves + 1;
    (1..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            GestureSample::new(offset * t, velocity * t)
        })
        .collect()
}

fn sample_frames(frames: Vec<Frame>, every: usize) -> Vec<Frame> {
    let len = frames.len();
    frames
        .into_iter()
        .enumerate()
        .filter(|(i, _)| i % every == 0 || i + 1 == len)
        .map(|(_, frame)| frame)
        .collect()
}

pub fn run_swipe(config: &StackConfig, args: &SwipeArgs, out: &mut dyn Write) -> Result<()> {
    if args.every == 0 {
        return Err(DemoError::invalid("--every must be > 0"));
    }
    if args.frame_ms == 0 {
        return Err(DemoError::invalid("--frame-ms must be > 0"));
    }
    let mut session = StackSession::from_config(config)?;
    let binding_before = session.controller().binding().to_vec();

    let update = session.swipe(&drag_samples(args.offset, args.velocity, args.moves));
    let frames = session.run_until_settled(Duration::from_millis(args.frame_ms), args.max_frames);
    tracing::info!(
        outcome = ?update.kind,
        frames = frames.len(),
        "swipe replayed"
    );

    let report = SwipeReport {
        outcome: format!("{:?}", update.kind),
        power: update.decision.map(|d| d.power),
        threshold: session.params().swipe_confidence_threshold,
        committed: update.committed(),
        binding_before,
        binding_after: session.controller().binding().to_vec(),
        front_title: session.front_item().map(|item| item.title.clone()),
        frames_to_settle: frames.len(),
        settled: session.is_settled(),
        frames: sample_frames(frames, args.every),
    };
    emit(out, &report)
}

// ---------------------------------------------------------------------------
// tap
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct TapStep {
    tap: usize,
    side: Side,
    label: &'static str,
    front_image: Option<String>,
}

#[derive(Debug, Serialize)]
struct TapReport {
    photo: u32,
    project_title: String,
    likes: u32,
    comments: u32,
    steps: Vec<TapStep>,
}

const MAX_TAP_FRAMES: usize = 10_000;

pub fn run_tap(config: &StackConfig, args: &TapArgs, out: &mut dyn Write) -> Result<()> {
    if args.frame_ms == 0 {
        return Err(DemoError::invalid("--frame-ms must be > 0"));
    }
    let mut session = BeforeAfterSession::new(config.photos.clone(), config.motion)?;
    session.set_index(args.photo)?;
    let dt = Duration::from_millis(args.frame_ms);

    let step = |session: &BeforeAfterSession, tap: usize| {
        let side = session.active_side();
        TapStep {
            tap,
            side,
            label: side.label(),
            front_image: session
                .image_for(session.controller().order().front())
                .map(str::to_string),
        }
    };

    let mut steps = vec![step(&session, 0)];
    for n in 1..=args.count {
        session.tap(0);
        let mut frames = 0;
        while !session.is_settled() && frames < MAX_TAP_FRAMES {
            session.tick(dt);
            frames += 1;
        }
        steps.push(step(&session, n));
    }

    let photo = session.current();
    let report = TapReport {
        photo: photo.id,
        project_title: photo.project_title.clone(),
        likes: photo.likes,
        comments: photo.comments,
        steps,
    };
    emit(out, &report)
}

// ---------------------------------------------------------------------------
// knobs
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct KnobReport {
    name: &'static str,
    label: &'static str,
    min: f64,
    max: f64,
    step: f64,
    value: f64,
    display: String,
    in_range: bool,
}

fn knob_reports(params: &MotionParams) -> Vec<KnobReport> {
    MotionKnob::ALL
        .into_iter()
        .map(|knob| {
            let range = knob.range();
            let value = params.get(knob);
            KnobReport {
                name: knob.name(),
                label: knob.label(),
                min: range.min,
                max: range.max,
                step: range.step,
                value,
                display: knob.format_value(value),
                in_range: range.contains(value),
            }
        })
        .collect()
}

pub fn run_knobs(config: &StackConfig, args: &KnobsArgs, out: &mut dyn Write) -> Result<()> {
    let mut params = config.motion;
    for &(knob, value) in &args.set {
        let value = if args.snap { knob.snap(value) } else { value };
        params.set(knob, value);
    }
    emit(out, &knob_reports(&params))
}
