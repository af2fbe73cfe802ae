//! # Win32 Driver
//!
//! Native Windows automation: window enumeration, restore/raise, and synthetic
//! keyboard input through `SendInput`.

use async_trait::async_trait;
use std::time::Duration;
use windows::Win32::Foundation::{BOOL, HWND, LPARAM};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    INPUT, INPUT_0, INPUT_KEYBOARD, KEYBD_EVENT_FLAGS, KEYBDINPUT, KEYEVENTF_KEYUP,
    KEYEVENTF_UNICODE, SendInput, VIRTUAL_KEY, VK_BACK, VK_CONTROL, VK_DELETE, VK_ESCAPE,
    VK_LWIN, VK_MENU, VK_RETURN, VK_SHIFT, VK_TAB,
};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetWindowTextW, IsIconic, IsWindowVisible, SW_RESTORE, SetForegroundWindow,
    ShowWindow,
};

use crate::domain::automation::{Key, KeyChord, Modifier, TargetError, WindowHandle};
use crate::domain::traits::AutomationTarget;

#[derive(Default)]
pub struct Win32Target;

impl Win32Target {
    pub fn new() -> Self {
        Self
    }
}

unsafe extern "system" fn collect_window(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let windows = unsafe { &mut *(lparam.0 as *mut Vec<WindowHandle>) };
    if unsafe { IsWindowVisible(hwnd) }.as_bool() {
        let mut title = [0u16; 512];
        let len = unsafe { GetWindowTextW(hwnd, &mut title) };
        if len > 0 {
            windows.push(WindowHandle {
                id: (hwnd.0 as usize).to_string(),
                title: String::from_utf16_lossy(&title[..len as usize]),
            });
        }
    }
    BOOL::from(true)
}

fn visible_windows() -> Result<Vec<WindowHandle>, TargetError> {
    let mut windows: Vec<WindowHandle> = Vec::new();
    unsafe {
        EnumWindows(
            Some(collect_window),
            LPARAM(&mut windows as *mut Vec<WindowHandle> as isize),
        )
    }
    .map_err(|e| TargetError::Driver(format!("EnumWindows failed: {e:?}")))?;
    Ok(windows)
}

fn hwnd_of(window: &WindowHandle) -> Result<HWND, TargetError> {
    let raw: usize = window
        .id
        .parse()
        .map_err(|_| TargetError::Driver(format!("invalid window id '{}'", window.id)))?;
    Ok(HWND(raw as *mut core::ffi::c_void))
}

fn virtual_key(key: Key) -> Result<VIRTUAL_KEY, TargetError> {
    Ok(match key {
        Key::Enter => VK_RETURN,
        Key::Delete => VK_DELETE,
        Key::Backspace => VK_BACK,
        Key::Escape => VK_ESCAPE,
        Key::Tab => VK_TAB,
        // Virtual-key codes for letters and digits are their uppercase ASCII values
        Key::Char(c) if c.is_ascii_alphanumeric() => VIRTUAL_KEY(c.to_ascii_uppercase() as u16),
        Key::Char(c) => return Err(TargetError::InvalidChord(c.to_string())),
    })
}

fn modifier_key(modifier: Modifier) -> VIRTUAL_KEY {
    match modifier {
        Modifier::Ctrl => VK_CONTROL,
        Modifier::Shift => VK_SHIFT,
        Modifier::Alt => VK_MENU,
        Modifier::Meta => VK_LWIN,
    }
}

fn key_input(vk: VIRTUAL_KEY, scan: u16, flags: KEYBD_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: vk,
                wScan: scan,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn send(inputs: &[INPUT]) -> Result<(), TargetError> {
    let sent = unsafe { SendInput(inputs, std::mem::size_of::<INPUT>() as i32) };
    if sent as usize == inputs.len() {
        Ok(())
    } else {
        Err(TargetError::Driver(format!(
            "SendInput accepted {sent} of {} events",
            inputs.len()
        )))
    }
}

#[async_trait]
impl AutomationTarget for Win32Target {
    async fn find_windows(&self, marker: &str) -> Result<Vec<WindowHandle>, TargetError> {
        let marker = marker.to_lowercase();
        Ok(visible_windows()?
            .into_iter()
            .filter(|w| w.title.to_lowercase().contains(&marker))
            .collect())
    }

    async fn focus(&self, window: &WindowHandle) -> Result<(), TargetError> {
        let hwnd = hwnd_of(window)?;
        unsafe {
            if IsIconic(hwnd).as_bool() {
                let _ = ShowWindow(hwnd, SW_RESTORE);
            }
            if !SetForegroundWindow(hwnd).as_bool() {
                return Err(TargetError::Driver(format!(
                    "SetForegroundWindow refused for '{}'",
                    window.title
                )));
            }
        }
        Ok(())
    }

    async fn send_chord(&self, chord: &KeyChord) -> Result<(), TargetError> {
        let key = virtual_key(chord.key)?;
        let mut inputs = Vec::with_capacity(chord.modifiers.len() * 2 + 2);
        for m in &chord.modifiers {
            inputs.push(key_input(modifier_key(*m), 0, KEYBD_EVENT_FLAGS(0)));
        }
        inputs.push(key_input(key, 0, KEYBD_EVENT_FLAGS(0)));
        inputs.push(key_input(key, 0, KEYEVENTF_KEYUP));
        for m in chord.modifiers.iter().rev() {
            inputs.push(key_input(modifier_key(*m), 0, KEYEVENTF_KEYUP));
        }
        send(&inputs)
    }

    async fn type_text(&self, text: &str, interval: Duration) -> Result<(), TargetError> {
        let mut units = [0u16; 2];
        for c in text.chars() {
            let mut inputs = Vec::with_capacity(4);
            for unit in c.encode_utf16(&mut units).iter() {
                inputs.push(key_input(VIRTUAL_KEY(0), *unit, KEYEVENTF_UNICODE));
                inputs.push(key_input(VIRTUAL_KEY(0), *unit, KEYEVENTF_UNICODE | KEYEVENTF_KEYUP));
            }
            send(&inputs)?;
            if !interval.is_zero() {
                tokio::time::sleep(interval).await;
            }
        }
        Ok(())
    }
}
