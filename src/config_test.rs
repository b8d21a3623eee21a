use super::*;

const KEYS: [&str; 7] =
    ["PORT", "REFRESH_SECS", "AUTO_RANDOMIZE_TICKS", "CLICK_QUEUE_CAPACITY", "DATA_PATH", "PIC_PATH", "INDEX_PATH"];

/// # Safety
/// Tests touching process-wide config keys run inside one test function to
/// avoid env races with each other.
unsafe fn clear_config_env() {
    for key in KEYS {
        unsafe { std::env::remove_var(key) };
    }
}

// =============================================================================
// env_parse: uses unique env var names to avoid races with parallel tests.
// =============================================================================

#[test]
fn env_parse_missing_returns_default() {
    let val: usize = env_parse("__TEST_PW_NONEXISTENT_KEY__", 42);
    assert_eq!(val, 42);
}

#[test]
fn env_parse_present_valid() {
    unsafe { std::env::set_var("__TEST_PW_EP_VALID__", " 99 ") };
    let val: u64 = env_parse("__TEST_PW_EP_VALID__", 0);
    assert_eq!(val, 99);
    unsafe { std::env::remove_var("__TEST_PW_EP_VALID__") };
}

#[test]
fn env_parse_present_invalid_returns_default() {
    unsafe { std::env::set_var("__TEST_PW_EP_INVALID__", "notanumber") };
    let val: u16 = env_parse("__TEST_PW_EP_INVALID__", 7);
    assert_eq!(val, 7);
    unsafe { std::env::remove_var("__TEST_PW_EP_INVALID__") };
}

#[test]
fn env_path_blank_returns_default() {
    unsafe { std::env::set_var("__TEST_PW_PATH_BLANK__", "   ") };
    assert_eq!(env_path("__TEST_PW_PATH_BLANK__", "a/b.json"), PathBuf::from("a/b.json"));
    unsafe { std::env::remove_var("__TEST_PW_PATH_BLANK__") };
}

// =============================================================================
// Config::from_env
// =============================================================================

#[test]
fn from_env_defaults_and_overrides() {
    unsafe { clear_config_env() };

    let cfg = Config::from_env();
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.refresh, Duration::from_secs(DEFAULT_REFRESH_SECS));
    assert_eq!(cfg.auto_randomize_ticks, DEFAULT_AUTO_RANDOMIZE_TICKS);
    assert_eq!(cfg.auto_randomize(), Duration::from_secs(600));
    assert_eq!(cfg.click_queue_capacity, DEFAULT_CLICK_QUEUE_CAPACITY);
    assert_eq!(cfg.data_path, PathBuf::from(DEFAULT_DATA_PATH));
    assert_eq!(cfg.pic_path, PathBuf::from(DEFAULT_PIC_PATH));
    assert_eq!(cfg.index_path, PathBuf::from(DEFAULT_INDEX_PATH));

    unsafe {
        std::env::set_var("PORT", "9000");
        std::env::set_var("REFRESH_SECS", "2");
        std::env::set_var("AUTO_RANDOMIZE_TICKS", "5");
        std::env::set_var("CLICK_QUEUE_CAPACITY", "8");
        std::env::set_var("DATA_PATH", "/tmp/walk/meta.json");
        std::env::set_var("PIC_PATH", "/tmp/walk/pic.png");
        std::env::set_var("INDEX_PATH", "/tmp/walk/index.html");
    }

    let cfg = Config::from_env();
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.refresh, Duration::from_secs(2));
    assert_eq!(cfg.auto_randomize(), Duration::from_secs(10));
    assert_eq!(cfg.click_queue_capacity, 8);
    assert_eq!(cfg.data_path, PathBuf::from("/tmp/walk/meta.json"));
    assert_eq!(cfg.pic_path, PathBuf::from("/tmp/walk/pic.png"));
    assert_eq!(cfg.schedule(), Schedule { refresh: Duration::from_secs(2), auto_randomize: Duration::from_secs(10) });

    unsafe {
        std::env::set_var("REFRESH_SECS", "0");
        std::env::set_var("AUTO_RANDOMIZE_TICKS", "0");
        std::env::set_var("CLICK_QUEUE_CAPACITY", "0");
    }

    let cfg = Config::from_env();
    assert_eq!(cfg.refresh, Duration::from_secs(1));
    assert_eq!(cfg.auto_randomize_ticks, 1);
    assert_eq!(cfg.click_queue_capacity, 1);

    unsafe {
        std::env::set_var("REFRESH_SECS", "368934881474191032");
        std::env::set_var("AUTO_RANDOMIZE_TICKS", "4294967295");
        std::env::set_var("CLICK_QUEUE_CAPACITY", "18446744073709551615");
    }

    let cfg = Config::from_env();
    assert_eq!(cfg.refresh, Duration::from_secs(MAX_REFRESH_SECS));
    assert_eq!(cfg.auto_randomize_ticks, MAX_AUTO_RANDOMIZE_TICKS);
    assert_eq!(cfg.click_queue_capacity, MAX_CLICK_QUEUE_CAPACITY);
    assert_eq!(cfg.auto_randomize(), Duration::from_secs(MAX_REFRESH_SECS * u64::from(MAX_AUTO_RANDOMIZE_TICKS)));

    unsafe { clear_config_env() };
}

#[test]
fn auto_randomize_overflow_falls_back_to_default_period() {
    let cfg = Config {
        port: DEFAULT_PORT,
        refresh: Duration::from_secs(u64::MAX / 50),
        auto_randomize_ticks: 100,
        click_queue_capacity: DEFAULT_CLICK_QUEUE_CAPACITY,
        data_path: PathBuf::from(DEFAULT_DATA_PATH),
        pic_path: PathBuf::from(DEFAULT_PIC_PATH),
        index_path: PathBuf::from(DEFAULT_INDEX_PATH),
    };
    assert_eq!(cfg.auto_randomize(), Duration::from_secs(600));
    assert_eq!(cfg.schedule().auto_randomize, Duration::from_secs(600));
}
