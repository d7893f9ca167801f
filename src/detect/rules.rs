//! Detection Rule Tables
//!
//! Bảng pattern khai báo cho detector catalog.
//! KHÔNG chứa logic - chỉ data. Detectors là pure functions trên các bảng này.

use once_cell::sync::Lazy;
use regex::Regex;

// ============================================================================
// REMOTE CONTROL TOOLS
// ============================================================================

/// Remote-access tool identifiers: (normalized app key, match patterns).
/// Patterns are matched case-insensitively against process name, command
/// line and resolved executable basename.
pub const REMOTE_CONTROL_TOOLS: &[(&str, &[&str])] = &[
    ("teamviewer", &["teamviewer"]),
    ("anydesk", &["anydesk"]),
    ("rustdesk", &["rustdesk"]),
    ("chrome-remote-desktop", &["chrome-remote-desktop", "remoting_host", "remoting_me2me"]),
    ("vnc", &["x11vnc", "tightvnc", "ultravnc", "realvnc", "vncserver", "vncviewer", "vino-server", "winvnc"]),
    ("rdp-client", &["mstsc", "xfreerdp", "rdesktop", "remmina"]),
    ("rdp-server", &["xrdp", "termservice"]),
    ("parsec", &["parsec"]),
    ("splashtop", &["splashtop", "strwinclt", "srserver"]),
    ("logmein", &["logmein", "lmiguardian"]),
    ("gotomypc", &["gotomypc", "g2comm", "g2svc"]),
    ("ammyy", &["ammyy"]),
    ("dwservice", &["dwagent", "dwservice"]),
    ("zoho-assist", &["zohoassist", "zaservice", "za_connect"]),
    ("supremo", &["supremo"]),
    ("ultraviewer", &["ultraviewer"]),
];

// ============================================================================
// APPS INAPPROPRIATE DURING A MONITORED SESSION
// ============================================================================

/// Idle instances still count - presence alone is the signal.
pub const SUSPICIOUS_APPS: &[&str] = &[
    // calculators
    "calc.exe", "calculator", "gnome-calculator", "kcalc", "speedcrunch", "qalculate",
    // text/code editors and IDEs
    "notepad.exe", "notepad++", "sublime_text", "gedit", "kate", "code.exe", "vscode",
    "idea64", "intellij", "pycharm", "eclipse", "netbeans", "atom",
    // math / engineering tools
    "matlab", "octave", "mathematica", "wolfram", "maple", "geogebra", "scilab", "maxima",
];

// ============================================================================
// MESSAGING / MEETING APPS
// ============================================================================

pub const MESSAGING_APPS: &[&str] = &[
    "discord", "slack", "telegram", "whatsapp", "signal-desktop", "viber", "skype",
    "zoom", "msteams", "teams.exe", "webex", "jitsi", "gotomeeting", "bluejeans",
    "wechat", "caprine", "element-desktop",
];

/// Native meeting apps for the screen-share detector - these multiplex
/// fewer sockets than a browser, so their thresholds are lower.
pub const MEETING_APPS: &[&str] = &[
    "zoom", "msteams", "teams.exe", "webex", "skype", "discord", "slack",
    "jitsi", "gotomeeting", "bluejeans",
];

// ============================================================================
// BROWSERS
// ============================================================================

pub const BROWSERS: &[&str] = &[
    "chrome", "chromium", "firefox", "msedge", "brave", "opera", "safari", "vivaldi",
];

// ============================================================================
// SCREEN CAPTURE TOOLS
// ============================================================================

/// Dedicated capture tools, only flagged with a capture-backend hint in args
pub const CAPTURE_TOOLS: &[&str] = &[
    "obs", "ffmpeg", "gst-launch", "wf-recorder", "simplescreenrecorder",
    "kazam", "peek", "sharex", "bandicam", "camtasia", "snagit", "loom",
];

/// Capture-backend hints inside a capture tool's command line
pub const CAPTURE_BACKEND_HINTS: &[&str] = &[
    "x11grab", "gdigrab", "avfoundation", "ximagesrc", "pipewiresrc",
    "screen-capture", "desktopcapture", "getdisplaymedia", "dshow",
];

/// Browser flags that force screen-capture permission
pub static BROWSER_CAPTURE_FLAGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        "(?i)auto-select-desktop-capture-source|use-fake-ui-for-media-stream|\
         enable-usermedia-screen-capturing|allow-http-screen-capture",
    )
    .expect("capture flag regex")
});

// ============================================================================
// SHARING TABS (url/title evidence)
// ============================================================================

/// Conferencing/sharing service domains for tab-url matching
pub const SHARING_DOMAINS: &[&str] = &[
    "meet.google.com", "zoom.us", "teams.microsoft.com", "teams.live.com",
    "webex.com", "whereby.com", "discord.com", "meet.jit.si", "gather.town",
    "around.co", "vowel.com", "screenleap.com",
];

/// Phrases browsers put in tab/window titles while sharing
pub const SHARING_TITLE_KEYWORDS: &[&str] = &[
    "is sharing your screen", "sharing your screen", "screen sharing",
    "sharing screen", "presenting", "remote control",
];

// ============================================================================
// VIRTUALIZATION INDICATORS
// ============================================================================

/// Substrings of system manufacturer/model strings
pub const VM_VENDOR_STRINGS: &[&str] = &[
    "vmware", "virtualbox", "innotek", "qemu", "kvm", "xen", "parallels",
    "virtual machine", "bochs", "bhyve",
];

/// Hypervisor guest/host helper processes
pub const VM_PROCESSES: &[&str] = &[
    "vmtoolsd", "vmware-vmx", "vmsrvc", "vmusrvc", "vboxservice", "vboxtray",
    "virtualbox", "qemu-system", "qemu-ga", "prl_tools", "prl_cc", "utm",
    "vmmem", "vmcompute",
];

// ============================================================================
// CLIPBOARD BRIDGES
// ============================================================================

/// Clipboard-sync utilities and remote-tool clipboard channels
pub const CLIPBOARD_BRIDGES: &[&str] = &[
    "rdpclip", "vdagent", "spice-vdagent", "barrier", "synergy", "input-leap",
    "kdeconnect", "clipshare", "1clipboard", "copyq", "clipbrd",
];

// ============================================================================
// SUSPICIOUS PORTS
// ============================================================================

/// Common remote-access ports (local or peer side)
pub const SUSPICIOUS_PORTS: &[u16] = &[
    22,    // ssh
    3389,  // rdp
    5900, 5901, 5902, 5903, 5904, 5905, 5906, 5907, 5908, 5909, 5910, // vnc family
    5938,  // teamviewer
    6568,  // anydesk
    7070,  // anydesk alt
    8200,  // gotomypc
    21115, 21116, 21117, // rustdesk relay
];

/// STUN/TURN real-time media relay ports
pub const RTC_RELAY_PORTS: &[u16] = &[3478, 5349, 19302];

// ============================================================================
// SYSTEM HELPER NOISE (false-positive suppression)
// ============================================================================

/// OS audio/driver subsystems, package-manager and installer invocations,
/// AV and casting helpers. Matches here are never reported.
pub const SYSTEM_HELPERS: &[&str] = &[
    // windows core / audio / drivers
    "audiodg", "dwm.exe", "csrss", "svchost", "fontdrvhost", "wudfhost",
    "taskhostw", "searchindexer", "dllhost", "sihost", "ctfmon",
    // windows av / health
    "msmpeng", "mpdefendercoreservice", "securityhealthservice", "mpcmdrun",
    // installers / package managers
    "msiexec", "trustedinstaller", "tiworker", "packagekitd", "dpkg", "apt ",
    "apt-get", "dnf", "pacman", "softwareupdated", "installd", "installer.exe",
    "snapd", "flatpak-system-helper",
    // audio / display plumbing (linux/macos)
    "pipewire", "wireplumber", "pulseaudio", "coreaudiod", "alsactl",
    "xdg-desktop-portal",
    // gpu vendor helpers
    "nvcontainer", "nvidia-container", "igfxem", "radeonsoftware",
    // casting helpers
    "cast_sender", "chromecast", "miracast", "airplayxpchelper", "mdnsresponder",
];

/// Command-line markers for daemonized/background invocations
pub static DAEMON_MARKERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new("(?i)--service\\b|-service\\b|--daemon\\b|daemonize|--tray\\b|--background\\b")
        .expect("daemon marker regex")
});

// ============================================================================
// MATCH HELPERS
// ============================================================================

/// Case-insensitive containment of any pattern in the haystack
pub fn matches_any(haystack: &str, patterns: &[&str]) -> bool {
    let lower = haystack.to_lowercase();
    patterns.iter().any(|p| lower.contains(p))
}

/// First matching pattern, for evidence reporting
pub fn first_match<'a>(haystack: &str, patterns: &'a [&str]) -> Option<&'a str> {
    let lower = haystack.to_lowercase();
    patterns.iter().find(|p| lower.contains(*p)).copied()
}

// ============================================================================
// TESTS
// ============================================================================
