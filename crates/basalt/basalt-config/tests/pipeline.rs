use basalt_config::{BasaltConfig, init_tracing};
use basalt_ring::{mpsc, spsc};
use std::thread;

fn temp_config_path(tag: &str) -> String {
    let pid = std::process::id();
    format!("/tmp/basalt_config_{tag}_{pid}.toml")
}

#[test]
fn ring_built_from_a_config_file() {
    let path = temp_config_path("spsc");
    std::fs::write(
        &path,
        "log_level = \"debug\"\n\n[ring]\ncapacity = 16\nversion_granularity = 4\n",
    )
    .unwrap();

    let config = BasaltConfig::load(path.clone()).unwrap();
    let _ = std::fs::remove_file(&path);
    init_tracing(&config.log_level);
    init_tracing(&config.log_level);

    let (mut writer, mut reader) = spsc::channel::<u64>(config.ring_config().unwrap());
    assert_eq!(reader.config().capacity, 16);
    assert_eq!(reader.config().slots_per_version(), 4);

    for v in 0..16 {
        writer.write(v);
    }
    for v in 0..16 {
        assert_eq!(reader.try_read(), Some(v));
    }
    assert_eq!(reader.try_read(), None);
}

#[test]
fn mpsc_ring_from_defaults() {
    let config = BasaltConfig::from_toml_str("[ring]\ncapacity = 256\n").unwrap();
    let (writer, mut reader) = mpsc::channel::<(u32, u32)>(config.ring_config().unwrap());

    let handles: Vec<_> = (0..2u32)
        .map(|p| {
            let mut writer = writer.clone();
            thread::spawn(move || {
                for i in 0..100u32 {
                    writer.write((p, i));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let mut got: Vec<(u32, u32)> = std::iter::from_fn(|| reader.try_read()).collect();
    assert_eq!(got.len(), 200);
    got.sort();
    let expected: Vec<(u32, u32)> = (0..2).flat_map(|p| (0..100).map(move |i| (p, i))).collect();
    assert_eq!(got, expected);
}
