// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use uuid::Uuid;

/// Source of unique tokens for file names.
pub trait IdentifierGenerator: Send + Sync {
    fn next_token(&self) -> String;
}

/// Generates random (version 4) UUID strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdentifierGenerator;

impl IdentifierGenerator for UuidIdentifierGenerator {
    fn next_token(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
