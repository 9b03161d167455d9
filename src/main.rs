use getopts::Options;
use log::*;
use raytrace_seed::*;
use std::path::Path;

struct Config {
    width: i64,
    height: i64,
    output: String,
    nthread: usize,
}

fn usage(program: &str, opts: &Options) -> String {
    opts.usage(&format!("Usage: {} [options]", program))
}

fn parse_args(args: &[String]) -> Result<Option<Config>, String> {
    let mut opts = Options::new();
    opts.optopt("", "width", "image width in pixels (default 400)", "PX");
    opts.optopt("", "height", "image height in pixels (default 225)", "PX");
    opts.optopt("o", "output", "output PNG path", "PATH");
    opts.optopt("t", "threads", "worker threads, 0 for one per CPU", "N");
    opts.optflag("", "help", "print this help");

    let program = args.first().map(String::as_str).unwrap_or("raytrace_seed");
    let matches = opts
        .parse(args.get(1..).unwrap_or(&[]))
        .map_err(|e| e.to_string())?;
    if matches.opt_present("help") {
        println!("{}", usage(program, &opts));
        return Ok(None);
    }

    fn num<T>(m: &getopts::Matches, name: &str, default: T) -> Result<T, String>
    where
        T: std::str::FromStr,
    {
        match m.opt_str(name) {
            Some(s) => s
                .parse()
                .map_err(|_| format!("--{} expects a number, got {:?}", name, s)),
            None => Ok(default),
        }
    }

    Ok(Some(Config {
        width: num(&matches, "width", 400)?,
        height: num(&matches, "height", 225)?,
        output: matches
            .opt_str("output")
            .unwrap_or_else(|| "output/output.png".to_string()),
        nthread: num(&matches, "threads", 0)?,
    }))
}

fn to_color(v: V3) -> Color {
    let channel = |c: f64| (c.max(0.0).min(1.0) * 255.999) as u8;
    Color::rgb(channel(v.x), channel(v.y), channel(v.z))
}

// white at the horizon fading to blue overhead
fn sky(dir: V3) -> V3 {
    let t = 0.5 * (dir.y + 1.0);
    V3::new(1.0, 1.0, 1.0) * (1.0 - t) + V3::new(0.5, 0.7, 1.0) * t
}

fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut scene = Scene::new(config.width, config.height)?;

    let w = scene.w() as f64;
    let h = scene.h() as f64;
    let view_h = 2.0;
    let view_w = view_h * w / h;
    let lower_left = V3::new(-view_w / 2.0, -view_h / 2.0, -1.0);

    scene.par_for_each_pixel(config.nthread, |x, y| {
        let u = (x as f64 + 0.5) / w;
        let v = 1.0 - (y as f64 + 0.5) / h;
        let dir = lower_left + V3::new(u * view_w, v * view_h, 0.0);
        match dir.normalize() {
            Ok(dir) => to_color(sky(dir)),
            Err(_) => Color::BLACK,
        }
    });

    if let Some(parent) = Path::new(&config.output).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    scene.persist(&config.output)?;
    info!("wrote {}x{} image to {}", scene.w(), scene.h(), config.output);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = std::env::args().collect::<Vec<_>>();
    let config = match parse_args(&args) {
        Ok(Some(config)) => config,
        Ok(None) => return,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(&config) {
        error!("{}", e);
        std::process::exit(1);
    }
}

#[test]
fn parse_args_without_argv() {
    let config = parse_args(&[]).unwrap().unwrap();
    assert_eq!((config.width, config.height), (400, 225));
    assert_eq!(config.output, "output/output.png");
    assert_eq!(config.nthread, 0);

    let args = ["seed", "--width", "8", "-t", "3"]
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>();
    let config = parse_args(&args).unwrap().unwrap();
    assert_eq!((config.width, config.height, config.nthread), (8, 225, 3));
    let bad = vec!["seed".to_string(), "--width".to_string(), "x".to_string()];
    assert!(parse_args(&bad).is_err());
}
