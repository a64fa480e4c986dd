use excessive_desk::compiler::{Compiler, Keyframe, Timing, TransitionError, MAX_FRAMES};
use excessive_desk::{Color, Fixture};

fn rgb_compiler() -> Compiler {
    let fixture = Fixture::Rgb {
        red: 17,
        green: 27,
        blue: 22,
    };
    Compiler::new(fixture.selector(), fixture.channel_map(), Timing::default())
}

fn keyframe(color: &str, duration_ms: f64) -> Keyframe {
    Keyframe::new(color.parse().unwrap(), duration_ms)
}

#[test]
fn total_frames_is_sum_of_floored_segments() {
    let compiler = rgb_compiler();
    let durations = [1000.0, 250.0, 70.0, 5000.0];
    let keyframes: Vec<Keyframe> = ["#FF0000", "#00FF00", "#0000FF", "#FFFFFF"]
        .iter()
        .zip(durations.iter())
        .map(|(color, duration)| keyframe(color, *duration))
        .collect();

    // floor(D / (1000 / 30)) without the inexact 33.33 ms divisor.
    let expected: usize = durations.iter().map(|d| (d * 30.0 / 1000.0).floor() as usize).sum();
    assert_eq!(expected, 30 + 7 + 2 + 150);
    assert_eq!(compiler.compile(&keyframes).unwrap().len(), expected);
}

#[test]
fn single_keyframe_is_one_static_frame() {
    let compiler = rgb_compiler();
    for duration in [0.0, 10.0, 1000.0, 1e9, -1.0].iter() {
        let frames = compiler.compile(&[keyframe("#FF0000", *duration)]).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].command(), "17=1.0000 27=0.0000 22=0.0000");
        assert_eq!(frames[0].effective_color().to_hex(), "#FF0000");
    }
}

#[test]
fn short_segments_are_skipped() {
    let compiler = rgb_compiler();
    let frames = compiler
        .compile(&[
            keyframe("#FF0000", 100.0),
            keyframe("#00FF00", 20.0),
            keyframe("#0000FF", 0.0),
        ])
        .unwrap();

    // Only red -> green contributes.
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0].effective_color().to_hex(), "#FF0000");
}

#[test]
fn segments_interpolate_toward_next_keyframe() {
    let compiler = rgb_compiler();
    let frames = compiler
        .compile(&[keyframe("#000000", 100.0), keyframe("#FFFFFF", 100.0)])
        .unwrap();

    let levels: Vec<String> = frames.iter().map(|frame| frame.command().to_owned()).collect();
    assert_eq!(
        levels,
        vec![
            "17=0.0000 27=0.0000 22=0.0000",
            "17=0.3333 27=0.3333 22=0.3333",
            "17=0.6667 27=0.6667 22=0.6667",
            "17=1.0000 27=1.0000 22=1.0000",
            "17=0.6667 27=0.6667 22=0.6667",
            "17=0.3333 27=0.3333 22=0.3333",
        ]
    );
}

#[test]
fn last_keyframe_wraps_to_first() {
    let compiler = rgb_compiler();
    let frames = compiler
        .compile(&[keyframe("#FF0000", 34.0), keyframe("#0000FF", 68.0)])
        .unwrap();

    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0].effective_color().to_hex(), "#FF0000");
    assert_eq!(frames[1].effective_color().to_hex(), "#0000FF");
    assert_eq!(frames[2].effective_color(), Color::new(0.5, 0.0, 0.5));
}

#[test]
fn all_segments_too_short_falls_back_to_first_color() {
    let compiler = rgb_compiler();
    let frames = compiler
        .compile(&[keyframe("#00FF00", 10.0), keyframe("#0000FF", 10.0)])
        .unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].command(), "17=0.0000 27=1.0000 22=0.0000");
}

#[test]
fn empty_list_is_rejected() {
    assert_eq!(rgb_compiler().compile(&[]), Err(TransitionError::Empty));
}

#[test]
fn oversized_animation_is_rejected() {
    let compiler = rgb_compiler();
    let result = compiler.compile(&[keyframe("#000000", 1e12), keyframe("#FFFFFF", 1000.0)]);
    assert!(matches!(
        result,
        Err(TransitionError::TooManyFrames { limit: MAX_FRAMES, .. })
    ));
}

#[test]
fn compile_is_deterministic() {
    let compiler = rgb_compiler();
    let keyframes = vec![keyframe("#123456", 500.0), keyframe("orange", 300.0)];
    assert_eq!(compiler.compile(&keyframes), compiler.compile(&keyframes));
}

#[test]
fn keyframes_parse_from_json() {
    let keyframes: Vec<Keyframe> =
        serde_json::from_str(r##"[{"color": "#FF0000", "duration": 1000}, {"color": "rgb(0, 0, 255)"}]"##).unwrap();
    assert_eq!(keyframes[0].duration_ms, 1000.0);
    assert_eq!(keyframes[1].duration_ms, 0.0);
    assert_eq!(keyframes[1].color.to_hex(), "#0000FF");

    let bad: Result<Vec<Keyframe>, _> = serde_json::from_str(r#"[{"color": "nope", "duration": 1}]"#);
    assert!(bad.is_err());
}
