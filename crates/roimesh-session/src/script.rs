//! Headless session playback.
//!
//! A script is a text file with one command per line. Lines starting with
//! `#` are comments, as is anything after a lone `#` word (colors like
//! `#FF0000` stay arguments). Blank lines are ignored. Relative paths are resolved against the
//! script's directory.
//!
//! ```text
//! load atlas.nii.gz
//! select 1 2 5
//! sigma 1.0
//! view top
//! render
//! screenshot out/top.png
//! ```
//!
//! | Command            | Arguments                          |
//! |--------------------|------------------------------------|
//! | `load`             | volume path                        |
//! | `values`           | value table path                   |
//! | `clear-values`     |                                    |
//! | `select`           | one or more labels                 |
//! | `select-all`       |                                    |
//! | `clear-selection`  |                                    |
//! | `color`            | color, then one or more labels     |
//! | `colormap`         | colormap name                      |
//! | `use-colormap`     | `on` / `off`                       |
//! | `range`            | min max                            |
//! | `auto-range`       |                                    |
//! | `sigma`            | blur width                         |
//! | `smooth-iter`      | pass count                         |
//! | `style`            | `3d` / `2d`                        |
//! | `edges`            | `on` / `off`                       |
//! | `view`             | `iso`, `left`, `right`, `top`, `front` |
//! | `orbit`            | azimuth elevation (degrees)        |
//! | `zoom`             | factor                             |
//! | `size`             | `WxH` or `W H`                     |
//! | `render`           |                                    |
//! | `screenshot`       | output path                        |
//!
//! Scheduled changes are flushed before `screenshot` and at the end of the
//! script, so a script never captures a stale frame.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

use roimesh_core::{Label, Rgb, Style, ViewPreset};
use tracing::{debug, info};

use crate::error::{ScriptError, ScriptResult};
use crate::messages::{SessionEvent, SessionMsg};
use crate::session::Session;

/// One parsed script line.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// 1-based line number.
    pub line: usize,
    /// Message sent to the session.
    pub msg: SessionMsg,
}

/// A parsed script.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    steps: Vec<Step>,
}

impl Script {
    /// Reads and parses a script file; relative paths inside resolve
    /// against its directory.
    pub fn read<P: AsRef<Path>>(path: P) -> ScriptResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::parse(&text, base)
    }

    /// Parses script text, resolving relative paths against `base`.
    pub fn parse(text: &str, base: &Path) -> ScriptResult<Self> {
        let mut steps = Vec::new();
        for (i, raw) in text.lines().enumerate() {
            let line = i + 1;
            let content = strip_comment(raw).trim();
            if content.is_empty() {
                continue;
            }
            let msg = parse_line(content, base).map_err(|m| ScriptError::parse(line, m))?;
            steps.push(Step { line, msg });
        }
        Ok(Self { steps })
    }

    /// Parsed steps in order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the script has no commands.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Plays every step against `session` and returns the status lines it
    /// produced, in order.
    pub fn run(&self, session: &mut Session) -> Vec<String> {
        let mut statuses = Vec::new();
        for step in &self.steps {
            if matches!(step.msg, SessionMsg::Screenshot(_)) {
                session.flush();
            }
            debug!(line = step.line, msg = ?step.msg, "script step");
            session.handle(step.msg.clone(), Instant::now());
            collect(session, &mut statuses);
        }
        session.flush();
        collect(session, &mut statuses);
        info!(steps = self.steps.len(), "script finished");
        statuses
    }
}

impl FromStr for Script {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, Path::new(""))
    }
}

/// Cuts a comment: a line starting with `#`, or a `#` standing alone as a
/// word. Colors such as `#FF0000` are not comments.
fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return "";
    }
    let bytes = line.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        let starts_word = i == 0 || bytes[i - 1].is_ascii_whitespace();
        let ends_word = bytes.get(i + 1).is_none_or(|c| c.is_ascii_whitespace());
        if b == b'#' && starts_word && ends_word {
            return &line[..i];
        }
    }
    line
}

fn collect(session: &mut Session, statuses: &mut Vec<String>) {
    for event in session.take_events() {
        if let SessionEvent::StatusChanged(s) = event {
            statuses.push(s);
        }
    }
}

fn parse_line(content: &str, base: &Path) -> Result<SessionMsg, String> {
    let mut words = content.split_whitespace();
    let Some(command) = words.next() else {
        return Err("empty command".into());
    };
    let args: Vec<&str> = words.collect();

    let msg = match command {
        "load" => SessionMsg::LoadVolume(path_arg(command, &args, base)?),
        "values" => SessionMsg::LoadValues(path_arg(command, &args, base)?),
        "clear-values" => no_args(command, &args, SessionMsg::ClearValues)?,
        "select" => {
            if args.is_empty() {
                return Err("select needs at least one label".into());
            }
            SessionMsg::Select(labels(&args)?)
        }
        "select-all" => no_args(command, &args, SessionMsg::SelectAll)?,
        "clear-selection" => no_args(command, &args, SessionMsg::ClearSelection)?,
        "color" => {
            let [color, rest @ ..] = args.as_slice() else {
                return Err("color needs a color and at least one label".into());
            };
            if rest.is_empty() {
                return Err("color needs at least one label".into());
            }
            SessionMsg::SetColor {
                color: Rgb::parse(color).map_err(|e| e.to_string())?,
                labels: labels(rest)?,
            }
        }
        "colormap" => SessionMsg::SetColormap(one(command, &args)?.to_string()),
        "use-colormap" => SessionMsg::SetUseColormap(switch(one(command, &args)?)?),
        "range" => {
            let [min, max] = two(command, &args)?;
            SessionMsg::SetRange {
                min: number(min)?,
                max: number(max)?,
            }
        }
        "auto-range" => no_args(command, &args, SessionMsg::AutoRange)?,
        "sigma" => SessionMsg::SetSigma(number(one(command, &args)?)?),
        "smooth-iter" => SessionMsg::SetSmoothIter(number(one(command, &args)?)?),
        "style" => SessionMsg::SetStyle(
            one(command, &args)?
                .parse::<Style>()
                .map_err(|e| e.to_string())?,
        ),
        "edges" => SessionMsg::SetShowEdges(switch(one(command, &args)?)?),
        "view" => SessionMsg::SetView(
            one(command, &args)?
                .parse::<ViewPreset>()
                .map_err(|e| e.to_string())?,
        ),
        "orbit" => {
            let [az, el] = two(command, &args)?;
            SessionMsg::Orbit {
                azimuth: number(az)?,
                elevation: number(el)?,
            }
        }
        "zoom" => SessionMsg::Zoom(number(one(command, &args)?)?),
        "size" => {
            let (width, height) = match args.as_slice() {
                [wh] => parse_size(wh)?,
                [w, h] => (number(w)?, number(h)?),
                _ => return Err("size takes WxH or W H".into()),
            };
            SessionMsg::SetViewport { width, height }
        }
        "render" => no_args(command, &args, SessionMsg::Render)?,
        "screenshot" => SessionMsg::Screenshot(path_arg(command, &args, base)?),
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(msg)
}

/// Parses `WxH`.
pub fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid size '{s}', expected WxH"))?;
    Ok((number(w)?, number(h)?))
}

fn no_args(command: &str, args: &[&str], msg: SessionMsg) -> Result<SessionMsg, String> {
    if args.is_empty() {
        Ok(msg)
    } else {
        Err(format!("{command} takes no arguments"))
    }
}

fn one<'a>(command: &str, args: &[&'a str]) -> Result<&'a str, String> {
    match args {
        [a] => Ok(*a),
        _ => Err(format!("{command} takes one argument")),
    }
}

fn two<'a>(command: &str, args: &[&'a str]) -> Result<[&'a str; 2], String> {
    match args {
        [a, b] => Ok([*a, *b]),
        _ => Err(format!("{command} takes two arguments")),
    }
}

fn path_arg(command: &str, args: &[&str], base: &Path) -> Result<PathBuf, String> {
    let path = PathBuf::from(one(command, args)?);
    Ok(if path.is_relative() { base.join(path) } else { path })
}

fn number<T: FromStr>(s: &str) -> Result<T, String> {
    s.parse().map_err(|_| format!("invalid number '{s}'"))
}

fn labels(args: &[&str]) -> Result<Vec<Label>, String> {
    args.iter()
        .map(|a| a.parse::<Label>().map_err(|e| e.to_string()))
        .collect()
}

fn switch(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(format!("expected on/off, got '{s}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roimesh_core::{Vec3, Volume};
    use roimesh_io::nifti::{self, DataType};

    #[test]
    fn parses_commands_and_comments() {
        let script: Script = "
            # setup
            load vol.nii   # trailing comment
            select 1 2.0
            color #f00 2
            size 320x240
            size 64 48
            edges on
            style 2d
            view top
            orbit 30 -10
        "
        .parse()
        .unwrap();
        let msgs: Vec<&SessionMsg> = script.steps().iter().map(|s| &s.msg).collect();
        assert_eq!(script.steps()[0].line, 3);
        assert_eq!(msgs[0], &SessionMsg::LoadVolume(PathBuf::from("vol.nii")));
        assert_eq!(msgs[1], &SessionMsg::Select(vec![Label(1.0), Label(2.0)]));
        assert_eq!(
            msgs[2],
            &SessionMsg::SetColor {
                labels: vec![Label(2.0)],
                color: Rgb::new(255, 0, 0)
            }
        );
        assert_eq!(msgs[3], &SessionMsg::SetViewport { width: 320, height: 240 });
        assert_eq!(msgs[4], &SessionMsg::SetViewport { width: 64, height: 48 });
        assert_eq!(msgs[5], &SessionMsg::SetShowEdges(true));
        assert_eq!(msgs[6], &SessionMsg::SetStyle(Style::Flat2d));
        assert_eq!(msgs[7], &SessionMsg::SetView(ViewPreset::Top));
        assert_eq!(
            msgs[8],
            &SessionMsg::Orbit {
                azimuth: 30.0,
                elevation: -10.0
            }
        );
    }

    #[test]
    fn errors_carry_line_numbers() {
        let err = "render\n\nfrobnicate 3\n".parse::<Script>().unwrap_err();
        assert!(matches!(err, ScriptError::Parse { line: 3, .. }));
        assert_eq!(err.to_string(), "line 3: unknown command 'frobnicate'");

        let err = "sigma\n".parse::<Script>().unwrap_err();
        assert_eq!(err.to_string(), "line 1: sigma takes one argument");
        assert!("view sideways".parse::<Script>().is_err());
        assert!("select 0".parse::<Script>().is_err());
        assert!("edges maybe".parse::<Script>().is_err());
        assert!("render now".parse::<Script>().is_err());
    }

    #[test]
    fn relative_paths_follow_script_dir() {
        let script = Script::parse("load a.nii\nscreenshot /tmp/x.png", Path::new("/data")).unwrap();
        assert_eq!(script.steps()[0].msg, SessionMsg::LoadVolume(PathBuf::from("/data/a.nii")));
        assert_eq!(script.steps()[1].msg, SessionMsg::Screenshot(PathBuf::from("/tmp/x.png")));
    }

    #[test]
    fn playback_writes_screenshot() {
        let dir = tempfile::tempdir().unwrap();
        let vol = Volume::from_fn([12, 12, 12], Vec3::ONE, Vec3::ZERO, |x, y, z| {
            let inside = (3..9).contains(&x) && (3..9).contains(&y) && (3..9).contains(&z);
            if inside { 4.0 } else { 0.0 }
        })
        .unwrap();
        nifti::write(dir.path().join("cube.nii"), &vol, DataType::U8).unwrap();
        let script_path = dir.path().join("run.txt");
        std::fs::write(
            &script_path,
            "load cube.nii\nsize 48x32\nsmooth-iter 3\ncolor #00ff00 4\nscreenshot shot.png\n",
        )
        .unwrap();

        let script = Script::read(&script_path).unwrap();
        assert_eq!(script.len(), 5);
        let mut session = Session::default();
        let statuses = script.run(&mut session);
        assert_eq!(statuses[0], "Loaded cube.nii; found 1 labels.");
        assert!(statuses.contains(&"Set color #00FF00 for 1 ROI(s).".to_string()));
        let shot = dir.path().join("shot.png");
        assert_eq!(statuses.last(), Some(&format!("Saved screenshot: {}", shot.display())));
        let img = roimesh_io::png::read(&shot).unwrap();
        assert_eq!((img.width, img.height), (48, 32));
    }

    #[test]
    fn missing_script_is_a_read_error() {
        let err = Script::read("/nonexistent/script.txt").unwrap_err();
        assert!(matches!(err, ScriptError::Read { .. }));
    }
}
