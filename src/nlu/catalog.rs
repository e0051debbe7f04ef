use serde::{Deserialize, Serialize};

use crate::kernel::policy::RiskTier;

/// The fixed set of intent categories the assistant understands. Declaration
/// order is the catalog order; ties in classifier confidence are broken by
/// this order so resolution stays reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    VolumeControl,
    AppLaunch,
    AppClose,
    FileMove,
    FileDelete,
    TaskCreate,
    TaskList,
    TaskComplete,
    NoteCreate,
    NoteSearch,
    TimerSet,
    WeatherQuery,
    SystemShutdown,
    ChatFallback,
    /// Sentinel for descriptors that lost their meaning (e.g. a corrupted
    /// confirmation token). Never produced by the classifier.
    Unknown,
}

/// Static definition of one category: the training utterances the classifier
/// is fitted on, the slots that must be present before the action may
/// execute, and the default risk tier.
pub struct CategorySpec {
    pub category: IntentCategory,
    pub patterns: &'static [&'static str],
    pub required_slots: &'static [&'static str],
    pub default_tier: RiskTier,
}

/// Immutable category catalog, built once at startup. This plays the role of
/// the offline training definition: everything the classifier and router know
/// about categories comes from here.
pub struct Catalog {
    entries: Vec<CategorySpec>,
}

impl Catalog {
    pub fn builtin() -> Self {
        use IntentCategory::*;
        use RiskTier::*;

        let entries = vec![
            CategorySpec {
                category: VolumeControl,
                patterns: &[
                    "set volume to 50",
                    "set the volume to 20 percent",
                    "volume up",
                    "turn the volume down",
                    "make it louder",
                    "quieter please",
                    "mute the sound",
                ],
                required_slots: &["level"],
                default_tier: Safe,
            },
            CategorySpec {
                category: AppLaunch,
                patterns: &[
                    "open chrome",
                    "open the browser",
                    "launch firefox",
                    "launch the music player",
                    "start spotify",
                    "run calculator",
                ],
                required_slots: &["target_app"],
                default_tier: Safe,
            },
            CategorySpec {
                category: AppClose,
                patterns: &[
                    "close chrome",
                    "close the window",
                    "quit spotify",
                    "quit the editor",
                    "kill the browser",
                    "stop the music app",
                ],
                required_slots: &["target_app"],
                default_tier: Caution,
            },
            CategorySpec {
                category: FileMove,
                patterns: &[
                    "move report.pdf to documents",
                    "move the photo into pictures",
                    "transfer notes.txt to backup",
                    "put this file in downloads",
                ],
                required_slots: &["source_path", "destination_path"],
                default_tier: Caution,
            },
            CategorySpec {
                category: FileDelete,
                patterns: &[
                    "delete report.pdf",
                    "delete all my files",
                    "delete everything in downloads",
                    "remove the file old.txt",
                    "erase temp.log",
                ],
                required_slots: &["path"],
                default_tier: Restricted,
            },
            CategorySpec {
                category: TaskCreate,
                patterns: &[
                    "remind me to call mom",
                    "remind me to stretch in 10 minutes",
                    "add a task buy groceries",
                    "create a task to water the plants",
                    "new task finish the report",
                ],
                required_slots: &["content"],
                default_tier: Safe,
            },
            CategorySpec {
                category: TaskList,
                patterns: &[
                    "list my tasks",
                    "show my tasks",
                    "show my todo list",
                    "what do i need to do",
                    "what are my tasks",
                ],
                required_slots: &[],
                default_tier: Safe,
            },
            CategorySpec {
                category: TaskComplete,
                patterns: &[
                    "complete task buy groceries",
                    "complete the task call mom",
                    "mark buy groceries as done",
                    "mark the report as done",
                    "finish task call mom",
                ],
                required_slots: &["content"],
                default_tier: Safe,
            },
            CategorySpec {
                category: NoteCreate,
                patterns: &[
                    "take a note",
                    "note that the wifi password changed",
                    "note that the meeting moved",
                    "write down milk and eggs",
                    "make a note about the meeting",
                ],
                required_slots: &["content"],
                default_tier: Safe,
            },
            CategorySpec {
                category: NoteSearch,
                patterns: &[
                    "search notes for wifi",
                    "search my notes for groceries",
                    "find my notes about the meeting",
                    "find notes on the project",
                ],
                required_slots: &["query"],
                default_tier: Safe,
            },
            CategorySpec {
                category: TimerSet,
                patterns: &[
                    "set a timer for 10 minutes",
                    "set a timer for 30 seconds",
                    "timer for 5 minutes",
                    "start a timer",
                ],
                required_slots: &["duration_secs"],
                default_tier: Safe,
            },
            CategorySpec {
                category: WeatherQuery,
                patterns: &[
                    "what is the weather",
                    "weather in london",
                    "weather forecast",
                    "is it raining",
                    "how cold is it outside",
                ],
                required_slots: &[],
                default_tier: Safe,
            },
            CategorySpec {
                category: SystemShutdown,
                patterns: &[
                    "shut down the computer",
                    "shutdown",
                    "power off the pc",
                    "turn off the computer",
                ],
                required_slots: &[],
                default_tier: Restricted,
            },
            CategorySpec {
                category: ChatFallback,
                patterns: &[
                    "hello",
                    "how are you",
                    "tell me a joke",
                    "thank you",
                    "good morning",
                    "what do you think",
                ],
                required_slots: &[],
                default_tier: Safe,
            },
        ];

        Self { entries }
    }

    pub fn entries(&self) -> &[CategorySpec] {
        &self.entries
    }

    pub fn spec_for(&self, category: IntentCategory) -> Option<&CategorySpec> {
        self.entries.iter().find(|s| s.category == category)
    }

    pub fn required_slots(&self, category: IntentCategory) -> &'static [&'static str] {
        self.spec_for(category).map(|s| s.required_slots).unwrap_or(&[])
    }

    /// The conversational category: routed straight to the chat collaborator,
    /// never through the policy gate.
    pub fn is_fallback(&self, category: IntentCategory) -> bool {
        category == IntentCategory::ChatFallback
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
