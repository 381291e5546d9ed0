//! Windows key injection via the SendInput API.
//!
//! The config file stores Windows Virtual Key codes directly, so no
//! translation is needed here: each [`KeyCode`] becomes one `KEYBDINPUT`
//! event, with `KEYEVENTF_KEYUP` for releases and the extended-key flag for
//! the VKs that require it.

#![cfg(target_os = "windows")]

use pad_core::KeyCode;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYBD_EVENT_FLAGS, KEYEVENTF_EXTENDEDKEY,
    KEYEVENTF_KEYUP, VIRTUAL_KEY,
};

use crate::application::execute_action::{InjectionError, KeyInjector};

/// Windows implementation of [`KeyInjector`] using SendInput.
pub struct WindowsKeyInjector;

impl WindowsKeyInjector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsKeyInjector {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyInjector for WindowsKeyInjector {
    fn key_down(&self, key: KeyCode) -> Result<(), InjectionError> {
        send_key(key.value(), false)
    }

    fn key_up(&self, key: KeyCode) -> Result<(), InjectionError> {
        send_key(key.value(), true)
    }
}

fn send_key(vk: u8, key_up: bool) -> Result<(), InjectionError> {
    let mut flags = KEYBD_EVENT_FLAGS(0);
    if key_up {
        flags |= KEYEVENTF_KEYUP;
    }

    // Extended keys need the EXTENDEDKEY flag
    let extended_vks: &[u8] = &[
        0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x28, // nav
        0x2D, 0x2E, // Insert, Delete
        0x5B, 0x5C, // Win keys
        0xA3, 0xA5, // Right Ctrl, Right Alt
    ];
    if extended_vks.contains(&vk) {
        flags |= KEYEVENTF_EXTENDEDKEY;
    }

    let input = INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(vk as u16),
                wScan: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    };
    // SAFETY: input is a valid INPUT structure on the stack
    let sent = unsafe {
        windows::Win32::UI::Input::KeyboardAndMouse::SendInput(
            &[input],
            std::mem::size_of::<INPUT>() as i32,
        )
    };

    if sent != 1 {
        return Err(InjectionError::Platform(format!(
            "SendInput rejected event for VK 0x{vk:02X}"
        )));
    }
    Ok(())
}
