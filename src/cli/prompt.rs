//! Interactive prompts.
//!
//! Each prompt re-asks until the pure validator behind it accepts the input.

use crate::core::selection;
use crate::core::tagger;
use crate::core::zones::{self, MenuEntry};
use crate::models::inventory::{Subscription, VirtualMachine};
use crate::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

/// Terminal prompter.
pub struct Prompter {
    theme: ColorfulTheme,
}

impl Prompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    /// Pick a subscription. A single subscription is taken without asking.
    pub fn select_subscription(&self, subscriptions: &[Subscription]) -> Result<Subscription> {
        match subscriptions {
            [] => Err(crate::Error::NoSubscriptions),
            [only] => Ok(only.clone()),
            _ => {
                let default = subscriptions
                    .iter()
                    .position(|s| s.is_default)
                    .unwrap_or(0);
                let idx = Select::with_theme(&self.theme)
                    .with_prompt("Select subscription")
                    .items(subscriptions)
                    .default(default)
                    .interact()?;
                Ok(subscriptions[idx].clone())
            }
        }
    }

    /// Ask for VM indices (e.g. `0,2,5-7`) against an inventory of `len`.
    pub fn select_vms(&self, len: usize) -> Result<Vec<usize>> {
        let input: String = Input::with_theme(&self.theme)
            .with_prompt("VMs to tag (indices or ranges, e.g. 0,2,5-7)")
            .validate_with(|input: &String| -> std::result::Result<(), String> {
                selection::parse_operator_selection(input, len)
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            })
            .interact_text()?;

        selection::parse_operator_selection(&input, len)
            .map_err(|e| crate::Error::other(e.to_string()))
    }

    /// Ask for a tag key.
    pub fn tag_key(&self) -> Result<String> {
        let input: String = Input::with_theme(&self.theme)
            .with_prompt(format!("Tag key (max {} chars)", tagger::MAX_TAG_KEY_LEN))
            .validate_with(|input: &String| -> std::result::Result<(), String> {
                tagger::validate_tag_key(input)
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            })
            .interact_text()?;

        tagger::validate_tag_key(&input).map_err(|e| crate::Error::other(e.to_string()))
    }

    /// Ask for a tag value.
    pub fn tag_value(&self) -> Result<String> {
        let input: String = Input::with_theme(&self.theme)
            .with_prompt(format!("Tag value (max {} chars)", tagger::MAX_TAG_VALUE_LEN))
            .validate_with(|input: &String| -> std::result::Result<(), String> {
                tagger::validate_tag_value(input)
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            })
            .interact_text()?;

        tagger::validate_tag_value(&input).map_err(|e| crate::Error::other(e.to_string()))
    }

    /// Pick one DR menu entry; returns its index.
    pub fn select_menu(&self, entries: &[MenuEntry]) -> Result<usize> {
        let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
        let idx = Select::with_theme(&self.theme)
            .with_prompt("Select VMs to shut down")
            .items(&labels[..])
            .default(labels.len().saturating_sub(1))
            .interact()?;
        Ok(idx)
    }

    /// Ask for a VM name until it matches one in the inventory.
    pub fn specific_vm(&self, vms: &[VirtualMachine]) -> Result<VirtualMachine> {
        let input: String = Input::with_theme(&self.theme)
            .with_prompt("VM name")
            .validate_with(|input: &String| -> std::result::Result<(), String> {
                match zones::find_by_name(vms, input) {
                    Some(_) => Ok(()),
                    None => Err(format!("No VM named '{}'", input.trim())),
                }
            })
            .interact_text()?;

        zones::find_by_name(vms, &input)
            .cloned()
            .ok_or_else(|| crate::Error::other(format!("No VM named '{}'", input.trim())))
    }

    /// Yes/no question.
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }
}

impl Default for Prompter {
    fn default() -> Self {
        Self::new()
    }
}
