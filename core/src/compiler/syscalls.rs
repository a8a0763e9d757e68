//! Interop syscall table.
//!
//! Functions of the interop packages have no compiled body; calls to them
//! become `SYSCALL <api>` followed by a `NOP`.

use hashbrown::HashMap;
use once_cell::sync::Lazy;

type Namespace = HashMap<&'static str, &'static str>;

static SYSCALLS: Lazy<HashMap<&'static str, Namespace>> = Lazy::new(|| {
    let table: &[(&str, &[(&str, &str)])] = &[
        (
            "account",
            &[
                ("GetBalance", "Neo.Account.GetBalance"),
                ("GetScriptHash", "Neo.Account.GetScriptHash"),
                ("GetVotes", "Neo.Account.GetVotes"),
                ("IsStandard", "Neo.Account.IsStandard"),
            ],
        ),
        (
            "asset",
            &[
                ("Create", "Neo.Asset.Create"),
                ("GetAdmin", "Neo.Asset.GetAdmin"),
                ("GetAmount", "Neo.Asset.GetAmount"),
                ("GetAssetID", "Neo.Asset.GetAssetId"),
                ("GetAssetType", "Neo.Asset.GetAssetType"),
                ("GetAvailable", "Neo.Asset.GetAvailable"),
                ("GetIssuer", "Neo.Asset.GetIssuer"),
                ("GetOwner", "Neo.Asset.GetOwner"),
                ("GetPrecision", "Neo.Asset.GetPrecision"),
                ("Renew", "Neo.Asset.Renew"),
            ],
        ),
        (
            "block",
            &[
                ("GetTransaction", "Neo.Block.GetTransaction"),
                ("GetTransactionCount", "Neo.Block.GetTransactionCount"),
                ("GetTransactions", "Neo.Block.GetTransactions"),
            ],
        ),
        (
            "blockchain",
            &[
                ("GetAccount", "Neo.Blockchain.GetAccount"),
                ("GetAsset", "Neo.Blockchain.GetAsset"),
                ("GetBlock", "Neo.Blockchain.GetBlock"),
                ("GetContract", "Neo.Blockchain.GetContract"),
                ("GetHeader", "Neo.Blockchain.GetHeader"),
                ("GetHeight", "Neo.Blockchain.GetHeight"),
                ("GetTransaction", "Neo.Blockchain.GetTransaction"),
                ("GetTransactionHeight", "Neo.Blockchain.GetTransactionHeight"),
                ("GetValidators", "Neo.Blockchain.GetValidators"),
            ],
        ),
        (
            "contract",
            &[
                ("Create", "Neo.Contract.Create"),
                ("Destroy", "Neo.Contract.Destroy"),
                ("GetScript", "Neo.Contract.GetScript"),
                ("GetStorageContext", "Neo.Contract.GetStorageContext"),
                ("IsPayable", "Neo.Contract.IsPayable"),
                ("Migrate", "Neo.Contract.Migrate"),
            ],
        ),
        (
            "engine",
            &[
                (
                    "GetCallingScriptHash",
                    "System.ExecutionEngine.GetCallingScriptHash",
                ),
                (
                    "GetEntryScriptHash",
                    "System.ExecutionEngine.GetEntryScriptHash",
                ),
                (
                    "GetExecutingScriptHash",
                    "System.ExecutionEngine.GetExecutingScriptHash",
                ),
                (
                    "GetScriptContainer",
                    "System.ExecutionEngine.GetScriptContainer",
                ),
            ],
        ),
        (
            "header",
            &[
                ("GetConsensusData", "Neo.Header.GetConsensusData"),
                ("GetHash", "Neo.Header.GetHash"),
                ("GetIndex", "Neo.Header.GetIndex"),
                ("GetMerkleRoot", "Neo.Header.GetMerkleRoot"),
                ("GetNextConsensus", "Neo.Header.GetNextConsensus"),
                ("GetPrevHash", "Neo.Header.GetPrevHash"),
                ("GetTimestamp", "Neo.Header.GetTimestamp"),
                ("GetVersion", "Neo.Header.GetVersion"),
            ],
        ),
        (
            "input",
            &[
                ("GetHash", "Neo.Input.GetHash"),
                ("GetIndex", "Neo.Input.GetIndex"),
            ],
        ),
        (
            "iterator",
            &[
                ("Create", "Neo.Iterator.Create"),
                ("Key", "Neo.Iterator.Key"),
                ("Keys", "Neo.Iterator.Keys"),
                ("Next", "Neo.Enumerator.Next"),
                ("Value", "Neo.Enumerator.Value"),
                ("Values", "Neo.Iterator.Values"),
            ],
        ),
        (
            "output",
            &[
                ("GetAssetID", "Neo.Output.GetAssetId"),
                ("GetScriptHash", "Neo.Output.GetScriptHash"),
                ("GetValue", "Neo.Output.GetValue"),
            ],
        ),
        (
            "runtime",
            &[
                ("CheckWitness", "Neo.Runtime.CheckWitness"),
                ("Deserialize", "Neo.Runtime.Deserialize"),
                ("GetTime", "Neo.Runtime.GetTime"),
                ("GetTrigger", "Neo.Runtime.GetTrigger"),
                ("Log", "Neo.Runtime.Log"),
                ("Notify", "Neo.Runtime.Notify"),
                ("Serialize", "Neo.Runtime.Serialize"),
            ],
        ),
        (
            "storage",
            &[
                ("Delete", "Neo.Storage.Delete"),
                ("Find", "Neo.Storage.Find"),
                ("Get", "Neo.Storage.Get"),
                ("GetContext", "Neo.Storage.GetContext"),
                ("Put", "Neo.Storage.Put"),
            ],
        ),
        (
            "transaction",
            &[
                ("GetAttributes", "Neo.Transaction.GetAttributes"),
                ("GetHash", "Neo.Transaction.GetHash"),
                ("GetInputs", "Neo.Transaction.GetInputs"),
                ("GetOutputs", "Neo.Transaction.GetOutputs"),
                ("GetReferences", "Neo.Transaction.GetReferences"),
                ("GetType", "Neo.Transaction.GetType"),
                ("GetUnspentCoins", "Neo.Transaction.GetUnspentCoins"),
            ],
        ),
    ];

    table
        .iter()
        .map(|(namespace, apis)| (*namespace, apis.iter().copied().collect()))
        .collect()
});

/// Whether calls qualified with `namespace` are syscalls.
pub fn is_namespace(namespace: &str) -> bool {
    SYSCALLS.contains_key(namespace)
}

/// Interop api name for `namespace.name`.
pub fn lookup(namespace: &str, name: &str) -> Option<&'static str> {
    SYSCALLS.get(namespace)?.get(name).copied()
}
