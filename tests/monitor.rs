use std::collections::VecDeque;
use std::fmt;

use kmonitor::monitor::{CommandEntry, BACKTRACE, BANNER, EXIT, HELP, KERNINFO, MAX_ARGS};
use kmonitor::{
    Config, Console, FrameLayout, KernelLayout, Monitor, NoSymbols, Registry, StackImage, Status,
    UnwindConfig, KERNBASE, WORD,
};

/// Stand-in for the trap frame the kernel hands the monitor.
struct Trapframe {
    _eip: usize,
}

const TF: Trapframe = Trapframe { _eip: 0xf0100000 };

/// Console fed from a fixed list of lines. `None` entries read as no line.
struct Script {
    lines: VecDeque<Option<&'static str>>,
    out: String,
}

impl Script {
    fn new(lines: &[Option<&'static str>]) -> Self {
        Self {
            lines: lines.iter().copied().collect(),
            out: String::new(),
        }
    }
}

impl fmt::Write for Script {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.out.push_str(s);
        Ok(())
    }
}

impl Console for Script {
    fn read_line<'b>(&mut self, prompt: &str, buf: &'b mut [u8]) -> Option<&'b str> {
        self.out.push_str(prompt);
        let line = self.lines.pop_front().expect("script ran out of lines")?;
        let len = line.len().min(buf.len());
        buf[..len].copy_from_slice(&line.as_bytes()[..len]);
        std::str::from_utf8(&buf[..len]).ok()
    }
}

const EMPTY: StackImage<'static> = StackImage::new(0, &[], 0);

fn kernel_monitor() -> Monitor<'static, NoSymbols, StackImage<'static>> {
    Monitor::new(Registry::kernel(), NoSymbols, EMPTY)
}

static WITH_EXIT: [CommandEntry; 5] = [HELP, KERNINFO, BACKTRACE, BANNER, EXIT];

fn dispatch<R, M>(monitor: &Monitor<'_, R, M>, line: &str) -> (Status, String)
where
    R: kmonitor::SymbolResolver,
    M: kmonitor::StackMemory,
{
    let mut out = String::new();
    let status = monitor.dispatch(line, &mut out, Some(&TF));
    (status, out)
}

#[test]
fn help_lists_every_command_once_in_order() {
    let (status, out) = dispatch(&kernel_monitor(), "help");
    assert_eq!(status, Status::Continue);
    assert_eq!(
        out,
        "help - Display this list of commands\n\
         kerninfo - Display information about the kernel\n\
         backtrace - Display backtrace of current kernel stack\n\
         banner - Display the boot banner\n"
    );
}

#[test]
fn help_follows_the_injected_registry() {
    let monitor = Monitor::new(Registry::new(&WITH_EXIT), NoSymbols, EMPTY);
    let (_, out) = dispatch(&monitor, "help");
    let names: Vec<&str> = out.lines().map(|l| l.split(" - ").next().unwrap()).collect();
    assert_eq!(names, ["help", "kerninfo", "backtrace", "banner", "exit"]);
}

#[test]
fn unknown_commands_are_reported_and_continue() {
    let monitor = kernel_monitor();
    for name in ["foo", "HELP", "exit", "backtrace2"] {
        let (status, out) = dispatch(&monitor, &format!("{} arg", name));
        assert_eq!(status, Status::Continue);
        assert_eq!(out, format!("Unknown command '{}'\n", name));
    }
}

#[test]
fn blank_lines_do_nothing() {
    let monitor = kernel_monitor();
    for line in ["", "   ", "\t\r\n"] {
        assert_eq!(dispatch(&monitor, line), (Status::Continue, String::new()));
    }
}

#[test]
fn too_many_arguments_run_no_handler() {
    let monitor = Monitor::new(Registry::new(&WITH_EXIT), NoSymbols, EMPTY);

    let line = vec!["exit"; MAX_ARGS].join(" ");
    let (status, out) = dispatch(&monitor, &line);
    assert_eq!(status, Status::Continue);
    assert_eq!(out, "Too many arguments (max 16)\n");

    let line = vec!["exit"; MAX_ARGS - 1].join(" ");
    assert_eq!(dispatch(&monitor, &line).0, Status::Terminate);
}

#[test]
fn negative_codes_terminate() {
    assert_eq!(Status::from_code(-1), Status::Terminate);
    assert_eq!(Status::from_code(i32::MIN), Status::Terminate);
    assert_eq!(Status::from_code(0), Status::Continue);
    assert_eq!(Status::from_code(1), Status::Continue);
}

#[test]
fn exit_ends_the_loop_with_input_left() {
    let monitor = Monitor::new(Registry::new(&WITH_EXIT), NoSymbols, EMPTY);
    let mut console = Script::new(&[Some("exit"), Some("help")]);
    monitor.run(&mut console, Some(&TF));

    assert_eq!(console.lines.len(), 1);
    assert_eq!(
        console.out,
        "Welcome to the kernel monitor!\nType 'help' for a list of commands.\nK> "
    );
}

#[test]
fn missing_lines_keep_the_loop_waiting() {
    let monitor = Monitor::new(Registry::new(&WITH_EXIT), NoSymbols, EMPTY);
    let mut console = Script::new(&[None, Some("nope"), None, Some("  exit  ")]);
    monitor.run(&mut console, None::<&Trapframe>);

    assert!(console.lines.is_empty());
    assert!(console
        .out
        .ends_with("K> K> Unknown command 'nope'\nK> K> "));
}

#[test]
fn configured_prompt() {
    let config = Config {
        prompt: "kmon$ ",
        ..Config::new()
    };
    let monitor = Monitor::new(Registry::new(&WITH_EXIT), NoSymbols, EMPTY).with_config(config);
    assert_eq!(monitor.config().prompt, "kmon$ ");
    let mut console = Script::new(&[Some("exit")]);
    monitor.run(&mut console, Some(&TF));
    assert!(console.out.ends_with("kmon$ "));
}

#[test]
fn kerninfo_prints_the_image_layout() {
    let layout = KernelLayout {
        kernbase: KERNBASE,
        start: 0x0010000c,
        entry: 0xf010000c,
        etext: 0xf0101a75,
        edata: 0xf0112300,
        end: 0xf0112960,
    };
    let monitor = kernel_monitor().with_layout(layout);
    let (status, out) = dispatch(&monitor, "kerninfo");
    assert_eq!(status, Status::Continue);
    assert_eq!(
        out,
        "Special kernel symbols:\n\
         \x20 _start                  0010000c (phys)\n\
         \x20 entry  f010000c (virt)  0010000c (phys)\n\
         \x20 etext  f0101a75 (virt)  00101a75 (phys)\n\
         \x20 edata  f0112300 (virt)  00112300 (phys)\n\
         \x20 end    f0112960 (virt)  00112960 (phys)\n\
         Kernel executable memory footprint: 75KB\n"
    );
}

#[test]
fn banner_honours_the_ansi_switch() {
    let (_, colored) = dispatch(&kernel_monitor(), "banner");
    assert!(colored.starts_with("\x1b[0;30m"));
    assert!(colored.ends_with("\x1b[0;37m"));
    assert!(colored.contains("TEDDY"));

    let plain_config = Config {
        ansi: false,
        ..Config::new()
    };
    let (status, plain) = dispatch(&kernel_monitor().with_config(plain_config), "banner");
    assert_eq!(status, Status::Continue);
    assert!(!plain.contains('\x1b'));
    assert_eq!(plain.lines().count(), 15);
    assert!(plain.lines().any(|l| l.ends_with("BOOM")));
}

#[test]
fn backtrace_command_walks_the_injected_stack() {
    let base = 0x7000;
    let words = [
        base + 3 * WORD,
        0x100020,
        0xaa,
        0,
        0x100010,
        0xbb,
    ];
    let image = StackImage::new(base, &words, base);
    let config = Config {
        unwind: UnwindConfig {
            layout: FrameLayout::X86,
            arg_words: 1,
            ..UnwindConfig::new()
        },
        ..Config::new()
    };
    let monitor = Monitor::new(Registry::kernel(), NoSymbols, image).with_config(config);

    let (status, out) = dispatch(&monitor, "backtrace");
    assert_eq!(status, Status::Continue);
    assert_eq!(
        out,
        format!(
            "Stack backtrace:\n  ebp {:08x}  eip 00100020  args 000000aa\n         <unknown>: no debug info\n  ebp {:08x}  eip 00100010  args 000000bb\n         <unknown>: no debug info\n",
            base,
            base + 3 * WORD
        )
    );
}
