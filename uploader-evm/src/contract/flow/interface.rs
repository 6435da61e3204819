// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use alloy::sol;

sol!(
    #[allow(missing_docs)]
    #[derive(Debug)]
    interface IFlow {
        struct SubmissionNode {
            bytes32 root;
            uint256 height;
        }

        struct Submission {
            uint256 length;
            bytes tags;
            SubmissionNode[] nodes;
        }

        function submit(Submission memory submission) external payable;

        function store(bytes32 root, uint64 dataSize) external payable;
    }
);
