//! Tests for the mode shift action

use super::*;
use crate::actions::{parse_action, ActionErrorCode, RangeOp};
use crate::input::RecordingMapper;
use parking_lot::Mutex;
use proptest::prelude::*;

type CallLog = Arc<Mutex<Vec<String>>>;

/// Records every capability call it receives into a shared log
#[derive(Debug)]
struct Recorder {
    name: String,
    log: CallLog,
}

impl Recorder {
    fn new(name: &str, log: &CallLog) -> ActionRef {
        Arc::new(Recorder {
            name: name.to_string(),
            log: Arc::clone(log),
        })
    }

    fn record(&self, call: String) {
        self.log.lock().push(format!("{}:{}", self.name, call));
    }
}

impl fmt::Display for Recorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rec({})", self.name)
    }
}

impl Action for Recorder {
    fn keyword(&self) -> &'static str {
        "rec"
    }

    fn compress(self: Arc<Self>) -> ActionRef {
        self
    }

    fn button_press(&self, _mapper: &mut dyn Mapper) {
        self.record("press".to_string());
    }

    fn button_release(&self, _mapper: &mut dyn Mapper) {
        self.record("release".to_string());
    }

    fn axis(&self, _mapper: &mut dyn Mapper, value: AxisValue, _what: PadStickTrigger) {
        self.record(format!("axis({})", value));
    }

    fn whole(&self, _mapper: &mut dyn Mapper, x: AxisValue, y: AxisValue, _what: PadStickTrigger) {
        self.record(format!("whole({},{})", x, y));
    }

    fn gyro(&self, _mapper: &mut dyn Mapper, sample: &GyroSample) {
        self.record(format!("gyro({},{},{},{})", sample.pitch, sample.yaw, sample.roll, sample.q1));
    }

    fn trigger(
        &self,
        _mapper: &mut dyn Mapper,
        old_pos: TriggerValue,
        pos: TriggerValue,
        _what: PadStickTrigger,
    ) {
        self.record(format!("trigger({},{})", old_pos, pos));
    }
}

fn cond(name: &str) -> Parameter {
    Parameter::String(name.to_string())
}

fn act(action: &ActionRef) -> Parameter {
    Parameter::Action(Arc::clone(action))
}

fn drain(log: &CallLog) -> Vec<String> {
    std::mem::take(&mut *log.lock())
}

/// `mode(A, a, B, b, d)` with recorders named after their branch
fn make_mode(log: &CallLog) -> ModeModifier {
    let a = Recorder::new("a", log);
    let b = Recorder::new("b", log);
    let d = Recorder::new("d", log);
    ModeModifier::new(&vec![cond("A"), act(&a), cond("B"), act(&b), act(&d)]).unwrap()
}

#[test]
fn test_construction_counts_branches() {
    let log = CallLog::default();
    let mm = make_mode(&log);
    assert_eq!(mm.modes().len(), 3);
    assert_eq!(mm.modes()[0].condition(), &ModeCondition::Button(SCButton::A));
    assert_eq!(mm.modes()[1].condition(), &ModeCondition::Button(SCButton::B));
    assert_eq!(mm.modes()[2].condition(), &ModeCondition::Default);
    assert!(mm.modes().iter().all(|m| !m.is_active()));
    assert_eq!(mm.to_string(), "mode(A, rec(a), B, rec(b), rec(d))");
}

#[test]
fn test_empty_mode_is_valid() {
    let mm = ModeModifier::new(&Vec::new()).unwrap();
    assert!(mm.modes().is_empty());

    let mut mapper = RecordingMapper::with_held(SCButton::A);
    mm.button_press(&mut mapper);
    mm.button_release(&mut mapper);
    assert!(mapper.events().is_empty());
}

#[test]
fn test_malformed_streams() {
    let log = CallLog::default();
    let a = Recorder::new("a", &log);

    // Condition with nothing after it
    let err = ModeModifier::new(&vec![cond("A"), act(&a), cond("B")]).unwrap_err();
    assert_eq!(err.code(), ActionErrorCode::InvalidNumberOfParameters);
    assert_eq!(err.to_string(), "Expected action after last parameter");

    // Not a button name
    let err = ModeModifier::new(&vec![cond("NOT_A_BUTTON"), act(&a)]).unwrap_err();
    assert_eq!(err.code(), ActionErrorCode::InvalidParameterType);
    assert_eq!(err.to_string(), "mode cannot take NOT_A_BUTTON as button/condition");

    // Numbers are not conditions
    let err = ModeModifier::new(&vec![Parameter::Int(3), act(&a)]).unwrap_err();
    assert_eq!(err.to_string(), "mode cannot take 3 as button/condition");

    // An action is only a condition-less default in last position
    let err = ModeModifier::new(&vec![act(&a), cond("A"), act(&a)]).unwrap_err();
    assert_eq!(err.code(), ActionErrorCode::InvalidParameterType);

    // Condition followed by something other than an action
    let err = ModeModifier::new(&vec![cond("A"), cond("B")]).unwrap_err();
    assert_eq!(err.code(), ActionErrorCode::InvalidParameterType);
    assert_eq!(err.to_string(), "mode cannot take B as action parameter");

    // Failed construction keeps no references
    assert_eq!(Arc::strong_count(&a), 1);
}

#[test]
fn test_parse_errors_through_registry() {
    let err = parse_action("mode(A, button(KEY_A), B)").unwrap_err();
    assert_eq!(err.code(), ActionErrorCode::InvalidNumberOfParameters);

    let err = parse_action("mode(FOO, button(KEY_A))").unwrap_err();
    assert_eq!(err.code(), ActionErrorCode::InvalidParameterType);
}

#[test]
fn test_press_picks_held_branch_or_default() {
    let log = CallLog::default();
    let mm = make_mode(&log);

    let mut mapper = RecordingMapper::with_held(SCButton::A);
    mm.button_press(&mut mapper);
    assert_eq!(drain(&log), vec!["a:press"]);
    assert!(mm.modes()[0].is_active());

    let mut mapper = RecordingMapper::new();
    mm.button_release(&mut mapper);
    mm.button_press(&mut mapper);
    assert_eq!(drain(&log), vec!["a:release", "d:press"]);
}

#[test]
fn test_first_matching_branch_wins() {
    let log = CallLog::default();
    let mm = make_mode(&log);

    let mut mapper = RecordingMapper::with_held(SCButton::A | SCButton::B);
    mm.button_press(&mut mapper);
    assert_eq!(drain(&log), vec!["a:press"]);
}

#[test]
fn test_held_button_beats_default() {
    let log = CallLog::default();
    let a = Recorder::new("a", &log);
    let d = Recorder::new("d", &log);
    let mm = ModeModifier::new(&vec![cond("A"), act(&a), act(&d)]).unwrap();

    let mut mapper = RecordingMapper::with_held(SCButton::B);
    assert!(std::ptr::eq(mm.choose(&mapper).unwrap(), &mm.modes()[1]));
    mapper.hold(SCButton::A);
    assert!(std::ptr::eq(mm.choose(&mapper).unwrap(), &mm.modes()[0]));
}

#[test]
fn test_no_default_selects_nothing() {
    let log = CallLog::default();
    let a = Recorder::new("a", &log);
    let mm = ModeModifier::new(&vec![cond("A"), act(&a)]).unwrap();

    let mut mapper = RecordingMapper::new();
    mm.button_press(&mut mapper);
    mm.axis(&mut mapper, 100, PadStickTrigger::LPad);
    assert!(drain(&log).is_empty());
}

#[test]
fn test_release_reaches_every_active_branch() {
    let log = CallLog::default();
    let mm = make_mode(&log);

    let mut mapper = RecordingMapper::with_held(SCButton::A);
    mm.button_press(&mut mapper);
    mapper.release(SCButton::A);
    mapper.hold(SCButton::B);
    mm.button_press(&mut mapper);
    mapper.release(SCButton::B);

    mm.button_release(&mut mapper);
    assert_eq!(drain(&log), vec!["a:press", "b:press", "a:release", "b:release"]);
    assert!(mm.modes().iter().all(|m| !m.is_active()));

    // Nothing active, nothing to release
    mm.button_release(&mut mapper);
    assert!(drain(&log).is_empty());
}

#[test]
fn test_axis_forwards_without_activation() {
    let log = CallLog::default();
    let mm = make_mode(&log);

    let mut mapper = RecordingMapper::with_held(SCButton::B);
    mm.axis(&mut mapper, -42, PadStickTrigger::RPad);
    assert_eq!(drain(&log), vec!["b:axis(-42)"]);
    assert!(!mm.modes()[1].is_active());
}

#[test]
fn test_stick_below_threshold_releases() {
    let log = CallLog::default();
    let mm = make_mode(&log);

    let mut mapper = RecordingMapper::with_held(SCButton::A);
    mm.whole(&mut mapper, 1000, 0, PadStickTrigger::Stick);
    assert_eq!(mm.held_sticks(), PadStickTrigger::Stick.bit());

    mm.whole(&mut mapper, 1, -1, PadStickTrigger::Stick);
    assert_eq!(drain(&log), vec!["a:whole(1000,0)", "a:whole(0,0)"]);
    assert!(mm.modes().iter().all(|m| !m.is_active()));
    assert_eq!(mm.held_sticks(), 0);

    // Magnitude 2 on one axis is enough to count as moved
    mm.whole(&mut mapper, 0, -2, PadStickTrigger::Stick);
    assert_eq!(drain(&log), vec!["a:whole(0,-2)"]);
}

#[test]
fn test_stick_switch_deactivates_sibling_first() {
    let log = CallLog::default();
    let mm = make_mode(&log);

    let mut mapper = RecordingMapper::with_held(SCButton::A);
    mm.whole(&mut mapper, 500, 500, PadStickTrigger::Stick);
    mapper.release(SCButton::A);
    mapper.hold(SCButton::B);
    mm.whole(&mut mapper, 600, 600, PadStickTrigger::Stick);
    mm.whole(&mut mapper, 700, 700, PadStickTrigger::Stick);

    assert_eq!(
        drain(&log),
        vec![
            "a:whole(500,500)",
            "a:whole(0,0)",
            "b:whole(600,600)",
            "b:whole(700,700)",
        ]
    );
    let active: Vec<bool> = mm.modes().iter().map(Mode::is_active).collect();
    assert_eq!(active, vec![false, true, false]);
}

#[test]
fn test_stick_with_no_branch_releases_all() {
    let log = CallLog::default();
    let a = Recorder::new("a", &log);
    let mm = ModeModifier::new(&vec![cond("A"), act(&a)]).unwrap();

    let mut mapper = RecordingMapper::with_held(SCButton::A);
    mm.whole(&mut mapper, 300, 300, PadStickTrigger::Stick);
    mapper.release(SCButton::A);
    mm.whole(&mut mapper, 300, 300, PadStickTrigger::Stick);
    assert_eq!(drain(&log), vec!["a:whole(300,300)", "a:whole(0,0)"]);
}

#[test]
fn test_pad_whole_releases_only_on_switch() {
    let log = CallLog::default();
    let mm = make_mode(&log);

    let mut mapper = RecordingMapper::with_held(SCButton::A);
    mm.whole(&mut mapper, 10, 20, PadStickTrigger::LPad);
    mm.whole(&mut mapper, 11, 21, PadStickTrigger::LPad);
    mapper.release(SCButton::A);
    mm.whole(&mut mapper, 12, 22, PadStickTrigger::LPad);

    assert_eq!(
        drain(&log),
        vec![
            "a:whole(10,20)",
            "a:whole(11,21)",
            "a:whole(0,0)",
            "d:whole(12,22)",
        ]
    );

    // Right stick does not use the deadzone
    mm.whole(&mut mapper, 0, 0, PadStickTrigger::RStick);
    assert_eq!(drain(&log), vec!["d:whole(0,0)"]);
}

#[test]
fn test_trigger_threshold() {
    let log = CallLog::default();
    let mm = make_mode(&log);

    let mut mapper = RecordingMapper::with_held(SCButton::A);
    mm.trigger(&mut mapper, 0, 5, PadStickTrigger::LTrigger);
    assert_eq!(drain(&log), vec!["a:trigger(0,5)"]);
    assert!(mm.modes()[0].is_active());
    assert_eq!(mm.held_triggers(), PadStickTrigger::LTrigger.bit());

    mm.trigger(&mut mapper, 5, 1, PadStickTrigger::LTrigger);
    assert_eq!(drain(&log), vec!["a:trigger(5,1)"]);
    assert!(!mm.modes()[0].is_active());
    assert_eq!(mm.held_triggers(), 0);
}

#[test]
fn test_trigger_does_not_deactivate_siblings() {
    let log = CallLog::default();
    let mm = make_mode(&log);

    let mut mapper = RecordingMapper::with_held(SCButton::A);
    mm.trigger(&mut mapper, 0, 50, PadStickTrigger::RTrigger);
    mapper.release(SCButton::A);
    mm.trigger(&mut mapper, 50, 60, PadStickTrigger::RTrigger);

    assert_eq!(drain(&log), vec!["a:trigger(0,50)", "d:trigger(50,60)"]);
    assert!(mm.modes()[0].is_active());
    assert!(mm.modes()[2].is_active());

    mm.trigger(&mut mapper, 60, 0, PadStickTrigger::RTrigger);
    assert_eq!(drain(&log), vec!["a:trigger(60,0)", "d:trigger(60,0)"]);
}

#[test]
fn test_gyro_zeroes_rates_on_release() {
    let log = CallLog::default();
    let mm = make_mode(&log);
    let sample = GyroSample {
        pitch: 10,
        yaw: 20,
        roll: 30,
        q1: 7,
        q2: 0,
        q3: 0,
        q4: 0,
    };

    let mut mapper = RecordingMapper::with_held(SCButton::B);
    mm.gyro(&mut mapper, &sample);
    mm.gyro(&mut mapper, &sample);
    mapper.release(SCButton::B);
    mm.gyro(&mut mapper, &sample);

    assert_eq!(
        drain(&log),
        vec![
            "b:gyro(10,20,30,7)",
            "b:gyro(10,20,30,7)",
            "b:gyro(0,0,0,7)",
            "d:gyro(10,20,30,7)",
        ]
    );
}

#[test]
fn test_range_condition_never_matches() {
    let log = CallLog::default();
    let r = Recorder::new("r", &log);
    let d = Recorder::new("d", &log);
    let range = RangeParam {
        axis: "LT".to_string(),
        op: RangeOp::Greater,
        value: 0.5,
    };
    let mm =
        ModeModifier::new(&vec![Parameter::Range(range.clone()), act(&r), act(&d)]).unwrap();
    assert_eq!(mm.modes()[0].condition(), &ModeCondition::Range(range));

    let mut mapper = RecordingMapper::with_held(SCButton::all());
    mm.button_press(&mut mapper);
    assert_eq!(drain(&log), vec!["d:press"]);
}

#[test]
fn test_extended_capabilities_broadcast() {
    let mm = parse_action("mode(A, button(KEY_A), B, axis(ABS_X), button(KEY_D))").unwrap();
    let data = HapticData {
        amplitude: 1000,
        ..HapticData::default()
    };
    mm.as_haptic().unwrap().set_haptic(data);
    mm.as_sensitivity().unwrap().set_sensitivity(2.0, 1.0, 1.0);

    // Haptic reaches both buttons, sensitivity the axis
    let mut mapper = RecordingMapper::with_held(SCButton::A);
    mm.button_press(&mut mapper);
    assert_eq!(mapper.take_events()[1], crate::input::OutputEvent::Haptic { data });

    let mut mapper = RecordingMapper::new();
    mm.button_press(&mut mapper);
    assert_eq!(mapper.take_events()[1], crate::input::OutputEvent::Haptic { data });

    let mut mapper = RecordingMapper::with_held(SCButton::B);
    mm.whole(&mut mapper, 32767, 0, PadStickTrigger::LPad);
    match &mapper.events()[0] {
        crate::input::OutputEvent::Axis { value, .. } => assert!((value - 2.0).abs() < 1e-9),
        other => panic!("unexpected event {:?}", other),
    }

    // Relative input is dropped
    let mut mapper = RecordingMapper::with_held(SCButton::B);
    mm.as_change().unwrap().change(&mut mapper, 0.5, 0.5, PadStickTrigger::RPad);
    assert!(mapper.events().is_empty());
}

#[test]
fn test_flags() {
    let log = CallLog::default();
    let mm = make_mode(&log);
    assert!(mm.flags().contains(ActionFlags::MODIFIER));
    assert!(!mm.is_none());
}

#[test]
fn test_compress_keeps_children_and_text() {
    let log = CallLog::default();
    let a = Recorder::new("a", &log);
    let d = Recorder::new("d", &log);
    let params = vec![cond("A"), act(&a), act(&d)];
    let mm: ActionRef = Arc::new(ModeModifier::new(&params).unwrap());
    drop(params);

    // Recorder handle, branch, retained parameter
    assert_eq!(Arc::strong_count(&a), 3);

    let mut slot = mm;
    compress_slot(&mut slot);
    assert_eq!(slot.to_string(), "mode(A, rec(a), rec(d))");
    assert_eq!(Arc::strong_count(&a), 3);

    // Running it again changes nothing
    compress_slot(&mut slot);
    assert_eq!(slot.to_string(), "mode(A, rec(a), rec(d))");

    drop(slot);
    assert_eq!(Arc::strong_count(&a), 1);
    assert_eq!(Arc::strong_count(&d), 1);
}

#[test]
fn test_compress_shared_mode_is_left_alone() {
    let mm = parse_action("mode(A, button(KEY_A), button(KEY_B))").unwrap();
    let other = Arc::clone(&mm);
    let mut slot = Arc::clone(&mm);
    compress_slot(&mut slot);
    assert!(Arc::ptr_eq(&slot, &other));
}

fn condition_strategy() -> impl Strategy<Value = Parameter> {
    prop_oneof![
        prop::sample::select(crate::input::BUTTON_NAMES.to_vec())
            .prop_map(|(_, name)| Parameter::String(name.to_string())),
        (0.0f64..1.0).prop_map(|value| Parameter::Range(RangeParam {
            axis: "LT".to_string(),
            op: RangeOp::GreaterOrEqual,
            value,
        })),
    ]
}

proptest! {
    #[test]
    fn prop_well_formed_streams_build(
        conditions in prop::collection::vec(condition_strategy(), 0..8),
        with_default in any::<bool>(),
    ) {
        let log = CallLog::default();
        let rec = Recorder::new("p", &log);
        let mut params = ParameterList::new();
        for condition in &conditions {
            params.push(condition.clone());
            params.push(act(&rec));
        }
        if with_default {
            params.push(act(&rec));
        }

        let mm = ModeModifier::new(&params).unwrap();
        prop_assert_eq!(mm.modes().len(), conditions.len() + usize::from(with_default));
        drop(mm);
        drop(params);
        prop_assert_eq!(Arc::strong_count(&rec), 1);
    }

    #[test]
    fn prop_malformed_streams_fail_without_leaks(
        conditions in prop::collection::vec(condition_strategy(), 0..6),
        bad in prop_oneof![
            Just(Parameter::Int(7)),
            Just(Parameter::Float(1.5)),
            Just(Parameter::String("NOT_A_BUTTON".to_string())),
        ],
        dangling in any::<bool>(),
    ) {
        let log = CallLog::default();
        let rec = Recorder::new("p", &log);
        let mut params = ParameterList::new();
        for condition in &conditions {
            params.push(condition.clone());
            params.push(act(&rec));
        }
        if dangling {
            // Condition with no action after it
            params.push(Parameter::String("A".to_string()));
        } else {
            params.push(bad);
            params.push(act(&rec));
        }

        let err = ModeModifier::new(&params).unwrap_err();
        let expected = if dangling {
            ActionErrorCode::InvalidNumberOfParameters
        } else {
            ActionErrorCode::InvalidParameterType
        };
        prop_assert_eq!(err.code(), expected);
        drop(params);
        prop_assert_eq!(Arc::strong_count(&rec), 1);
    }
}
